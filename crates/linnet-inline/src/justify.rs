//! Text justification.
//!
//! [§ 7.3 Text Alignment: the text-align property](https://www.w3.org/TR/css-text-3/#text-align-property)
//!
//! "justify: Text is justified according to the method specified by the
//! text-justify property, in order to exactly fill the line box."
//!
//! [§ 7.4 Justification Method: the text-justify property](https://www.w3.org/TR/css-text-3/#text-justify-property)
//!
//! Extra width is split between word separators and other characters, then
//! every text run on the line is widened by its share and every box after it
//! is shifted along. Left-to-right lines push content to the right;
//! right-to-left lines pull it to the left.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::config::JustificationConfig;
use crate::error::Result;
use crate::inline_box::InlineChild;
use crate::tree::{BoxId, BoxTree, NodeKind};

/// [§ 7.4.1 Justification Opportunities](https://www.w3.org/TR/css-text-3/#justification-opportunity)
///
/// "Word-separator characters include the space (U+0020), the no-break
/// space (U+00A0), ... the ideographic space (U+3000)"
pub(crate) const fn is_justifiable_space(ch: char) -> bool {
    matches!(ch, ' ' | '\u{a0}' | '\u{3000}')
}

/// Number of justifiable characters on a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CharCounts {
    /// Word separators.
    pub space_count: usize,
    /// Every other character.
    pub non_space_count: usize,
}

/// Extra advance added after each character of a justified line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JustificationInfo {
    /// Added after each word separator.
    pub space_adjust: f32,
    /// Added after each other character.
    pub non_space_adjust: f32,
}

impl JustificationInfo {
    /// Split `extra_width` over the counted characters.
    ///
    /// With both kinds present the configured shares apply. Otherwise the
    /// kind that exists takes all of it. With nothing counted every adjust
    /// is zero.
    #[must_use]
    pub fn distribute(
        counts: CharCounts,
        extra_width: f32,
        config: &JustificationConfig,
    ) -> Self {
        let spaces = counts.space_count as f32;
        let non_spaces = counts.non_space_count as f32;
        match (counts.space_count, counts.non_space_count) {
            (0, 0) => Self::default(),
            (0, _) => Self {
                space_adjust: 0.0,
                non_space_adjust: extra_width / non_spaces,
            },
            (_, 0) => Self {
                space_adjust: extra_width / spaces,
                non_space_adjust: 0.0,
            },
            _ => {
                let total = config.space_share + config.non_space_share;
                Self {
                    space_adjust: extra_width * config.space_share / total / spaces,
                    non_space_adjust: extra_width * config.non_space_share / total / non_spaces,
                }
            }
        }
    }
}

/// [§ 2.1 Specifying Directionality](https://www.w3.org/TR/css-writing-modes-3/#direction)
///
/// Inline base direction of a line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// "Left-to-right directionality."
    #[default]
    Ltr,
    /// "Right-to-left directionality."
    Rtl,
}

impl BoxTree {
    /// Count justifiable characters under inline box `id`.
    ///
    /// Nested inline boxes are always descended into, but text is only
    /// counted in boxes whose style enables justification.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`](crate::InlineError::InvalidArgument)
    /// if `id` is not an inline box.
    pub fn count_justifiable_chars(&self, id: BoxId, counts: &mut CharCounts) -> Result<()> {
        let inline = self.inline(id)?;
        let justify_this = inline.style().text_justify;
        for child in inline.children() {
            match child {
                InlineChild::Inline(nested) => self.count_justifiable_chars(*nested, counts)?,
                InlineChild::Text(run) if justify_this => run.count_justifiable_chars(counts),
                InlineChild::Text(_) | InlineChild::Replaced(_) => {}
            }
        }
        Ok(())
    }

    /// Apply justification to inline box `id` on a left-to-right line.
    ///
    /// `carried` is the shift already applied to content before this box.
    /// Text runs move by what this box has grown so far; child boxes move by
    /// the running total and nested inline boxes fold their growth back in.
    ///
    /// Returns how much this box grew.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`](crate::InlineError::InvalidArgument)
    /// if `id` is not an inline box.
    pub fn justify_ltr(
        &mut self,
        id: BoxId,
        info: &JustificationInfo,
        carried: f32,
    ) -> Result<f32> {
        let mut running_total = carried;
        let mut result = 0.0;

        let len = self.inline(id)?.children().len();
        for index in 0..len {
            let nested = match &mut self.inline_mut(id)?.children_mut()[index] {
                InlineChild::Text(run) => {
                    run.x += result;
                    let adj = run.total_adjustment(info);
                    run.width += adj;
                    result += adj;
                    running_total += adj;
                    None
                }
                InlineChild::Inline(child) | InlineChild::Replaced(child) => Some(*child),
            };
            if let Some(child) = nested {
                self.node_mut(child)?.x += running_total;
                if matches!(self.node(child)?.kind, NodeKind::Inline(_)) {
                    let adj = self.justify_ltr(child, info, running_total)?;
                    result += adj;
                    running_total += adj;
                }
            }
        }

        self.inline_mut(id)?.inline_width += result;
        Ok(result)
    }

    /// Mirror of [`BoxTree::justify_ltr`] for right-to-left lines.
    ///
    /// Text runs move left by this box's growth including their own; nested
    /// inline boxes are justified before they are shifted.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`](crate::InlineError::InvalidArgument)
    /// if `id` is not an inline box.
    pub fn justify_rtl(
        &mut self,
        id: BoxId,
        info: &JustificationInfo,
        carried: f32,
    ) -> Result<f32> {
        let mut running_total = carried;
        let mut result = 0.0;

        let len = self.inline(id)?.children().len();
        for index in 0..len {
            let nested = match &mut self.inline_mut(id)?.children_mut()[index] {
                InlineChild::Text(run) => {
                    let adj = run.total_adjustment(info);
                    run.width += adj;
                    result += adj;
                    running_total += adj;
                    run.x -= result;
                    None
                }
                InlineChild::Inline(child) | InlineChild::Replaced(child) => Some(*child),
            };
            if let Some(child) = nested {
                if matches!(self.node(child)?.kind, NodeKind::Inline(_)) {
                    let adj = self.justify_rtl(child, info, running_total)?;
                    result += adj;
                    running_total += adj;
                }
                self.node_mut(child)?.x -= running_total;
            }
        }

        self.inline_mut(id)?.inline_width += result;
        Ok(result)
    }

    /// Justify line box `line` so its content fills `target_width`.
    ///
    /// The current content width is the sum of the top-level boxes' widths.
    /// A line that is already as wide as the target is left alone.
    ///
    /// Returns the distribution that was applied.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`](crate::InlineError::InvalidArgument)
    /// if `line` is not a line box.
    pub fn justify_line(
        &mut self,
        line: BoxId,
        target_width: f32,
        direction: Direction,
        config: &JustificationConfig,
    ) -> Result<JustificationInfo> {
        let NodeKind::Line(line_box) = &self.node(line)?.kind else {
            return Err(self.wrong_kind(line, "line box"));
        };
        let children = line_box.children.clone();

        let mut counts = CharCounts::default();
        let mut content_width = 0.0;
        for &child in &children {
            match &self.node(child)?.kind {
                NodeKind::Inline(inline) => {
                    content_width += inline.inline_width;
                    self.count_justifiable_chars(child, &mut counts)?;
                }
                NodeKind::Replaced(replaced) => content_width += replaced.width,
                NodeKind::Block(_) | NodeKind::Line(_) => {}
            }
        }

        let extra = target_width - content_width;
        if extra <= 0.0 {
            return Ok(JustificationInfo::default());
        }
        let info = JustificationInfo::distribute(counts, extra, config);

        #[cfg(feature = "layout-trace")]
        log::trace!(
            "justify {line} ({direction}): extra={extra} spaces={} others={}",
            counts.space_count,
            counts.non_space_count
        );

        let mut running_total = 0.0;
        for child in children {
            let is_inline = matches!(self.node(child)?.kind, NodeKind::Inline(_));
            match direction {
                Direction::Ltr => {
                    self.node_mut(child)?.x += running_total;
                    if is_inline {
                        running_total += self.justify_ltr(child, &info, running_total)?;
                    }
                }
                Direction::Rtl => {
                    if is_inline {
                        running_total += self.justify_rtl(child, &info, running_total)?;
                    }
                    self.node_mut(child)?.x -= running_total;
                }
            }
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribute_splits_eighty_twenty() {
        let counts = CharCounts {
            space_count: 2,
            non_space_count: 4,
        };
        let info = JustificationInfo::distribute(counts, 10.0, &JustificationConfig::default());
        assert!((info.space_adjust - 4.0).abs() < 1e-5);
        assert!((info.non_space_adjust - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_distribute_single_kind_takes_everything() {
        let only_letters = CharCounts {
            space_count: 0,
            non_space_count: 5,
        };
        let info =
            JustificationInfo::distribute(only_letters, 10.0, &JustificationConfig::default());
        assert!(info.space_adjust.abs() < f32::EPSILON);
        assert!((info.non_space_adjust - 2.0).abs() < 1e-5);

        let nothing = JustificationInfo::distribute(
            CharCounts::default(),
            10.0,
            &JustificationConfig::default(),
        );
        assert_eq!(nothing, JustificationInfo::default());
    }

    #[test]
    fn test_direction_parses() {
        assert_eq!("rtl".parse::<Direction>().unwrap(), Direction::Rtl);
        assert_eq!(Direction::Ltr.to_string(), "ltr");
    }

    #[test]
    fn test_justifiable_spaces() {
        assert!(is_justifiable_space(' '));
        assert!(is_justifiable_space('\u{a0}'));
        assert!(is_justifiable_space('\u{3000}'));
        assert!(!is_justifiable_space('\t'));
    }
}
