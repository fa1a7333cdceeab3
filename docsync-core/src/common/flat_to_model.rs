//! Converts a flat event stream into a document model.
//!
//! # The High-Level Concept
//!
//! The document model is shallow: a document holds blocks, and only lists hold
//! a further level (their items). So instead of a general stack we keep a
//! single "open block" slot. `Start*` events open the slot, inline events fill
//! it, and `End*` events close it and append the finished section.
//!
//! # Normalization
//!
//! Every parser funnels through this builder, so it is the one place where
//! the model's normal form is enforced:
//!
//! - whitespace runs inside inline text collapse to one space
//! - adjacent runs with the same weight are merged, empty runs are dropped
//! - blocks are trimmed at both ends; spaces around line breaks are dropped
//! - consecutive line breaks collapse into one
//! - line breaks become spaces in headings and list items
//! - bold is dropped from headings; `formatted_*` is only kept when some run
//!   is bold
//! - blocks (and list items) that end up empty are dropped
//! - ids from the source are kept when non-empty and unused; otherwise a
//!   fresh id is generated
//!
//! # The Algorithm
//!
//! 1. **Initialization:**
//!    - Require `StartDocument`, start with no open block
//!
//! 2. **Processing `Start` Events:**
//!    - Open the block (or the list item); opening a block while another is
//!      open is an error
//!
//! 3. **Processing Content Events (Inline / LineBreak):**
//!    - Append to the open block or list item
//!
//! 4. **Processing `End` Events:**
//!    - Check the event matches the open block, normalize and emit it
//!
//! 5. **Completion:**
//!    - `EndDocument` must arrive with no open block and nothing after it

use crate::model::events::Event;
use crate::model::nodes::{
    collapse_whitespace, runs_text, DocumentJson, DocumentSection, FormattedRun, HeadingLevel,
    SectionId, SectionKind,
};
use std::collections::HashSet;
use thiserror::Error;

/// Error type for flat-to-model conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Stream did not open with `StartDocument`
    #[error("Event stream must begin with StartDocument")]
    MissingDocumentStart,
    /// End event with no open block
    #[error("Unexpected end event: {0}")]
    UnexpectedEnd(String),
    /// Mismatched start/end events
    #[error("Mismatched events: expected {expected}, found {found}")]
    MismatchedEvents { expected: String, found: String },
    /// A block was opened inside another block
    #[error("Blocks cannot be nested: {0}")]
    NestedBlock(String),
    /// Inline content in a place that cannot hold it
    #[error("Unexpected inline content: {0}")]
    UnexpectedInline(String),
    /// Events remaining after document end
    #[error("Extra events after document end")]
    ExtraEvents,
    /// Stream ended with a block still open or without `EndDocument`
    #[error("Unclosed containers at end of stream")]
    UnclosedContainers,
}

#[derive(Debug)]
enum OpenBlock {
    Heading {
        level: HeadingLevel,
        id: Option<SectionId>,
        runs: Vec<FormattedRun>,
    },
    Paragraph {
        id: Option<SectionId>,
        runs: Vec<FormattedRun>,
    },
    List {
        id: Option<SectionId>,
        items: Vec<Vec<FormattedRun>>,
        current: Option<Vec<FormattedRun>>,
    },
}

impl OpenBlock {
    fn name(&self) -> &'static str {
        match self {
            OpenBlock::Heading { .. } => "heading",
            OpenBlock::Paragraph { .. } => "paragraph",
            OpenBlock::List { .. } => "list",
        }
    }

    /// Runs that inline content should currently be appended to.
    fn target(&mut self) -> Result<&mut Vec<FormattedRun>, ConversionError> {
        match self {
            OpenBlock::Heading { runs, .. } | OpenBlock::Paragraph { runs, .. } => Ok(runs),
            OpenBlock::List {
                current: Some(runs),
                ..
            } => Ok(runs),
            OpenBlock::List { current: None, .. } => Err(ConversionError::UnexpectedInline(
                "inline content inside a list but outside a list item".to_string(),
            )),
        }
    }

    /// Normalize the block. Returns `None` when nothing but whitespace remains.
    fn finish(self) -> (Option<SectionId>, Option<SectionKind>) {
        match self {
            OpenBlock::Heading { level, id, runs } => {
                let content = runs_text(&finish_runs(fold_breaks(runs)));
                let kind = (!content.is_empty()).then(|| SectionKind::Heading { level, content });
                (id, kind)
            }
            OpenBlock::Paragraph { id, runs } => {
                let runs = finish_runs(runs);
                if runs.is_empty() {
                    return (id, None);
                }
                let content = runs_text(&runs);
                let formatted_content = runs.iter().any(FormattedRun::is_bold).then_some(runs);
                (
                    id,
                    Some(SectionKind::Paragraph {
                        content,
                        formatted_content,
                    }),
                )
            }
            OpenBlock::List { id, items, .. } => {
                let items: Vec<Vec<FormattedRun>> = items
                    .into_iter()
                    .map(|runs| finish_runs(fold_breaks(runs)))
                    .filter(|runs| !runs.is_empty())
                    .collect();
                if items.is_empty() {
                    return (id, None);
                }
                let texts = items.iter().map(|runs| runs_text(runs)).collect();
                let any_bold = items.iter().flatten().any(FormattedRun::is_bold);
                (
                    id,
                    Some(SectionKind::List {
                        items: texts,
                        formatted_items: any_bold.then_some(items),
                    }),
                )
            }
        }
    }
}

#[derive(Debug, Default)]
struct Builder {
    sections: Vec<DocumentSection>,
    used_ids: HashSet<SectionId>,
    open: Option<OpenBlock>,
}

impl Builder {
    fn open_block(&mut self, block: OpenBlock) -> Result<(), ConversionError> {
        if let Some(current) = &self.open {
            return Err(ConversionError::NestedBlock(format!(
                "{} inside {}",
                block.name(),
                current.name()
            )));
        }
        self.open = Some(block);
        Ok(())
    }

    fn close_block(&mut self, found: &'static str) -> Result<(), ConversionError> {
        let block = self
            .open
            .take()
            .ok_or_else(|| ConversionError::UnexpectedEnd(found.to_string()))?;
        if block.name() != found {
            return Err(ConversionError::MismatchedEvents {
                expected: block.name().to_string(),
                found: found.to_string(),
            });
        }
        if let OpenBlock::List {
            current: Some(_), ..
        } = &block
        {
            return Err(ConversionError::MismatchedEvents {
                expected: "list item".to_string(),
                found: found.to_string(),
            });
        }

        let (candidate, kind) = block.finish();
        if let Some(kind) = kind {
            let id = self.assign_id(candidate);
            self.sections.push(DocumentSection { id, kind });
        }
        Ok(())
    }

    fn open_item(&mut self) -> Result<(), ConversionError> {
        match &mut self.open {
            Some(OpenBlock::List { current, .. }) if current.is_none() => {
                *current = Some(Vec::new());
                Ok(())
            }
            Some(OpenBlock::List { .. }) => Err(ConversionError::NestedBlock(
                "list item inside list item".to_string(),
            )),
            Some(other) => Err(ConversionError::NestedBlock(format!(
                "list item inside {}",
                other.name()
            ))),
            None => Err(ConversionError::NestedBlock(
                "list item outside of a list".to_string(),
            )),
        }
    }

    fn close_item(&mut self) -> Result<(), ConversionError> {
        match &mut self.open {
            Some(OpenBlock::List { items, current, .. }) => {
                let runs = current
                    .take()
                    .ok_or_else(|| ConversionError::UnexpectedEnd("list item".to_string()))?;
                items.push(runs);
                Ok(())
            }
            _ => Err(ConversionError::UnexpectedEnd("list item".to_string())),
        }
    }

    fn push_run(&mut self, run: &FormattedRun) -> Result<(), ConversionError> {
        let block = self.open.as_mut().ok_or_else(|| {
            ConversionError::UnexpectedInline(format!("'{}' outside of a block", run.text))
        })?;
        block.target()?.push(FormattedRun {
            text: collapse_whitespace(&run.text),
            formatting: run.formatting.clone(),
        });
        Ok(())
    }

    fn push_break(&mut self) -> Result<(), ConversionError> {
        let block = self.open.as_mut().ok_or_else(|| {
            ConversionError::UnexpectedInline("line break outside of a block".to_string())
        })?;
        append_break(block.target()?);
        Ok(())
    }

    fn assign_id(&mut self, candidate: Option<SectionId>) -> SectionId {
        let id = match candidate {
            Some(id) if !id.is_empty() && !self.used_ids.contains(&id) => id,
            _ => SectionId::generate(),
        };
        self.used_ids.insert(id.clone());
        id
    }
}

/// Converts a flat event stream into a `DocumentJson`.
pub fn events_to_document(events: &[Event]) -> Result<DocumentJson, ConversionError> {
    let mut iter = events.iter();
    if iter.next() != Some(&Event::StartDocument) {
        return Err(ConversionError::MissingDocumentStart);
    }

    let mut builder = Builder::default();
    let mut finished = false;

    for event in iter {
        if finished {
            return Err(ConversionError::ExtraEvents);
        }
        match event {
            Event::StartDocument => {
                return Err(ConversionError::MismatchedEvents {
                    expected: "block or end of document".to_string(),
                    found: "start of document".to_string(),
                });
            }
            Event::EndDocument => {
                if builder.open.is_some() {
                    return Err(ConversionError::UnclosedContainers);
                }
                finished = true;
            }
            Event::StartHeading { level, id } => builder.open_block(OpenBlock::Heading {
                level: *level,
                id: id.clone(),
                runs: Vec::new(),
            })?,
            Event::StartParagraph { id } => builder.open_block(OpenBlock::Paragraph {
                id: id.clone(),
                runs: Vec::new(),
            })?,
            Event::StartList { id } => builder.open_block(OpenBlock::List {
                id: id.clone(),
                items: Vec::new(),
                current: None,
            })?,
            Event::EndHeading => builder.close_block("heading")?,
            Event::EndParagraph => builder.close_block("paragraph")?,
            Event::EndList => builder.close_block("list")?,
            Event::StartListItem => builder.open_item()?,
            Event::EndListItem => builder.close_item()?,
            Event::Inline(run) => builder.push_run(run)?,
            Event::LineBreak => builder.push_break()?,
        }
    }

    if !finished {
        return Err(ConversionError::UnclosedContainers);
    }

    Ok(DocumentJson::new(builder.sections))
}

/// Attach a line break to the last non-empty run, dropping trailing spaces.
fn append_break(runs: &mut Vec<FormattedRun>) {
    while let Some(last) = runs.last_mut() {
        let len = last.text.trim_end_matches(' ').len();
        last.text.truncate(len);
        if last.text.is_empty() {
            runs.pop();
            continue;
        }
        if !last.text.ends_with('\n') {
            last.text.push('\n');
        }
        return;
    }
}

fn fold_breaks(runs: Vec<FormattedRun>) -> Vec<FormattedRun> {
    runs.into_iter()
        .map(|mut run| {
            run.text = run.text.replace('\n', " ");
            run
        })
        .collect()
}

/// Merge, trim and drop empty runs so the sequence is in normal form.
fn finish_runs(runs: Vec<FormattedRun>) -> Vec<FormattedRun> {
    let mut out: Vec<FormattedRun> = Vec::new();

    for run in runs {
        let bold = run.is_bold();
        let text = match out.last() {
            None => run.text.trim_start(),
            Some(prev) if prev.text.ends_with(' ') || prev.text.ends_with('\n') => {
                run.text.trim_start_matches(' ')
            }
            Some(_) => run.text.as_str(),
        };
        if text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(prev) if prev.is_bold() == bold => prev.text.push_str(text),
            _ => out.push(FormattedRun::with_bold(text, bold)),
        }
    }

    while let Some(last) = out.last_mut() {
        let len = last.text.trim_end().len();
        last.text.truncate(len);
        if !last.text.is_empty() {
            break;
        }
        out.pop();
    }

    out
}
