//! Page files: markup content plus side-button definitions.
//!
//! Line rules, applied in order:
//! - empty line: paragraph break (a lone `\n` in the content)
//! - `#...`: comment, dropped
//! - `$caption!command`: button; `\n` in the caption is a line break
//! - anything else: appended to the content followed by `\n`

use std::path::Path;

use log::{debug, warn};

use crate::error::KioskError;

/// Command that stops the current video
pub const STOP_VIDEO: &str = "video_stop";

/// A side button as declared in a page file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Button {
    pub caption: String,
    pub command: String,
}

/// What pressing a button does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PlayVideo(String),
    LoadPage(String),
    StopVideo,
    /// Empty or unrecognised command
    Nothing,
}

impl Command {
    /// Classify by file extension, case-insensitive, else the stop literal
    pub fn parse(command: &str) -> Self {
        let extension = command
            .rfind('.')
            .filter(|&dot| dot > 0)
            .map(|dot| &command[dot..]);

        match extension {
            Some(ext) if ext.eq_ignore_ascii_case(".mp4") => Command::PlayVideo(command.to_string()),
            Some(ext) if ext.eq_ignore_ascii_case(".txt") => Command::LoadPage(command.to_string()),
            _ if command == STOP_VIDEO => Command::StopVideo,
            _ => Command::Nothing,
        }
    }
}

impl Button {
    /// Parse the text after the leading `$`
    pub fn parse(definition: &str) -> Self {
        let mut button = Button::default();
        let mut chars = definition.chars();

        while let Some(c) = chars.next() {
            match c {
                '!' => {
                    button.command = chars.as_str().to_string();
                    break;
                }
                '\\' => match chars.clone().next() {
                    Some('n') => {
                        chars.next();
                        button.caption.push('\n');
                    }
                    // lone backslash is dropped
                    _ => {}
                },
                c => button.caption.push(c),
            }
        }
        button
    }

    pub fn action(&self) -> Command {
        Command::parse(&self.command)
    }
}

/// A loaded page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub content: String,
    pub buttons: Vec<Button>,
}

impl Page {
    pub fn parse(source: &str) -> Self {
        let mut page = Page::default();

        for line in source.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                page.content.push('\n');
            } else if line.starts_with('#') {
                continue;
            } else if let Some(definition) = line.strip_prefix('$') {
                page.buttons.push(Button::parse(definition));
            } else {
                page.content.push_str(line);
                page.content.push('\n');
            }
        }

        if page.buttons.len() > 8 {
            warn!("{} buttons declared, only 8 are reachable", page.buttons.len());
        }
        page
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, KioskError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| KioskError::Content {
            path: path.to_path_buf(),
            source,
        })?;
        let page = Self::parse(&source);
        debug!(
            "page {}: {} chars, {} buttons",
            path.display(),
            page.len(),
            page.buttons.len()
        );
        Ok(page)
    }

    /// Content length in characters, the unit of reveal progress
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn button(&self, index: usize) -> Option<&Button> {
        self.buttons.get(index)
    }
}
