//! Hosts a [`PagedView`] in a Discord message.
//!
//! The first page is sent with one button per available action. Button custom ids are
//! `<invocation id>:<action>`, so presses on other views never reach this loop. The loop
//! owns the view mutably and handles one press at a time; once the view expires the
//! buttons are stripped from the message.
//!
//! Embeds are fitted to Discord's limits before sending: long field values are spread
//! over several fields between lines, and the longest texts are shortened until the
//! whole embed fits the 6000 character total.

use crate::{
    bot::{Context, handlers::settle},
    core::paginator::{ActionOutcome, DisplayUnit, FALLBACK_VALUE, IgnoreReason, NavAction, PagedView},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::time::Instant;
use tracing::debug;

const MAX_FIELDS: usize = 25;
const MAX_TITLE: usize = 256;
const MAX_FIELD_NAME: usize = 256;
const MAX_FIELD_VALUE: usize = 1024;
const MAX_DESCRIPTION: usize = 4096;
const MAX_FOOTER: usize = 2048;
const MAX_EMBED_TOTAL: usize = 6000;

/// Cuts `text` to at most `max` characters, marking the cut with an ellipsis.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Packs whole lines of `value` into pieces of at most `max` characters. Only a single
/// line longer than `max` is cut.
fn split_lines(value: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for line in value.lines() {
        let line = truncate_chars(line, max);
        let len = line.chars().count();
        if current_len > 0 && current_len + 1 + len > max {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(&line);
        current_len += len;
    }
    if current_len > 0 {
        pieces.push(current);
    }
    pieces
}

/// Shortens the longest texts until their combined length fits `budget`.
///
/// Every text is capped at the largest length that keeps the total within budget, so
/// short texts stay whole and only the long ones lose their tails.
fn fit_budget(mut texts: Vec<&mut String>, budget: usize) {
    let lengths: Vec<usize> = texts.iter().map(|text| text.chars().count()).collect();
    if lengths.iter().sum::<usize>() <= budget {
        return;
    }
    let total_at = |cap: usize| lengths.iter().map(|&len| len.min(cap)).sum::<usize>();
    let (mut low, mut high) = (1, lengths.iter().copied().max().unwrap_or(1));
    while low < high {
        let mid = (low + high).div_ceil(2);
        if total_at(mid) <= budget {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    for text in &mut texts {
        if text.chars().count() > low {
            let cut = truncate_chars(text, low);
            **text = cut;
        }
    }
}

/// Text of one embed, already within Discord's limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedParts {
    /// Embed title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// `(name, value, inline)` triples
    pub fields: Vec<(String, String, bool)>,
    /// Footer text
    pub footer: String,
}

impl EmbedParts {
    /// Characters Discord counts towards the embed total.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.title.chars().count()
            + self.description.as_deref().map_or(0, |d| d.chars().count())
            + self
                .fields
                .iter()
                .map(|(name, value, _)| name.chars().count() + value.chars().count())
                .sum::<usize>()
            + self.footer.chars().count()
    }
}

/// Fields of `unit` as `(name, value, inline)`.
///
/// A value longer than one field allows is spread over consecutive fields with the same
/// name, cut only between lines, as long as the field limit leaves room; otherwise it is
/// truncated.
#[must_use]
pub fn embed_fields(unit: &DisplayUnit) -> Vec<(String, String, bool)> {
    let kept = unit.fields.len().min(MAX_FIELDS);
    let mut fields = Vec::with_capacity(kept);
    for (index, field) in unit.fields.iter().take(kept).enumerate() {
        let name = truncate_chars(&field.name, MAX_FIELD_NAME);
        if field.value.trim().is_empty() {
            fields.push((name, FALLBACK_VALUE.to_string(), false));
            continue;
        }
        let pieces = split_lines(&field.value, MAX_FIELD_VALUE);
        let still_to_come = kept - index - 1;
        if pieces.len() > 1 && fields.len() + pieces.len() + still_to_come <= MAX_FIELDS {
            fields.extend(pieces.into_iter().map(|piece| (name.clone(), piece, false)));
        } else {
            fields.push((name, truncate_chars(&field.value, MAX_FIELD_VALUE), false));
        }
    }
    fields
}

/// Clamps every part of `unit` to its own limit and the whole to the embed total.
#[must_use]
pub fn fit_embed(unit: &DisplayUnit) -> EmbedParts {
    let mut parts = EmbedParts {
        title: truncate_chars(&unit.title, MAX_TITLE),
        description: unit
            .description
            .as_deref()
            .map(|description| truncate_chars(description, MAX_DESCRIPTION)),
        fields: embed_fields(unit),
        footer: truncate_chars(&unit.footer, MAX_FOOTER),
    };

    let budget = MAX_EMBED_TOTAL.saturating_sub(parts.footer.chars().count());
    let texts = std::iter::once(&mut parts.title)
        .chain(parts.description.iter_mut())
        .chain(
            parts
                .fields
                .iter_mut()
                .flat_map(|(name, value, _)| [name, value]),
        )
        .collect();
    fit_budget(texts, budget);
    parts
}

/// Embed for one rendered page.
#[must_use]
pub fn to_embed(unit: &DisplayUnit) -> serenity::CreateEmbed {
    let parts = fit_embed(unit);
    let mut embed = serenity::CreateEmbed::new()
        .title(parts.title)
        .footer(serenity::CreateEmbedFooter::new(parts.footer));
    if let Some(description) = parts.description {
        embed = embed.description(description);
    }
    embed.fields(parts.fields)
}

const fn button_label(action: NavAction) -> &'static str {
    match action {
        NavAction::First => "⏮",
        NavAction::Previous => "◀",
        NavAction::Next => "▶",
        NavAction::Last => "⏭",
        NavAction::ToggleView => "Toggle view",
    }
}

/// Custom id of `action`'s button for the view started by invocation `ctx_id`.
#[must_use]
pub fn button_id(ctx_id: u64, action: NavAction) -> String {
    format!("{ctx_id}:{}", action.as_str())
}

/// Action named by a custom id, if it belongs to invocation `ctx_id`.
#[must_use]
pub fn action_from_id(ctx_id: u64, custom_id: &str) -> Option<&str> {
    custom_id
        .strip_prefix(&ctx_id.to_string())
        .and_then(|rest| rest.strip_prefix(':'))
}

fn controls(ctx_id: u64, view: &PagedView) -> Vec<serenity::CreateActionRow> {
    let at_start = view.current_index() == 0;
    let at_end = view.current_index() >= view.last_index();
    let buttons = view
        .available_actions()
        .into_iter()
        .map(|action| {
            let disabled = match action {
                NavAction::First | NavAction::Previous => at_start,
                NavAction::Next | NavAction::Last => at_end,
                NavAction::ToggleView => false,
            };
            let style = if action == NavAction::ToggleView {
                serenity::ButtonStyle::Primary
            } else {
                serenity::ButtonStyle::Secondary
            };
            serenity::CreateButton::new(button_id(ctx_id, action))
                .label(button_label(action))
                .style(style)
                .disabled(disabled)
        })
        .collect();
    vec![serenity::CreateActionRow::Buttons(buttons)]
}

/// Sends the view's first page and drives it from button presses until it expires.
///
/// Views without a timeout stay live until the process stops. The buttons are removed
/// even when answering a press fails.
pub async fn run_paged_view(ctx: Context<'_>, mut view: PagedView) -> Result<()> {
    let ctx_id = ctx.id();
    let mut shown = view.render();

    let handle = ctx
        .send(
            poise::CreateReply::default()
                .embed(to_embed(&shown))
                .components(controls(ctx_id, &view)),
        )
        .await?;

    let outcome = serve_view(ctx, ctx_id, &mut view, &mut shown).await;

    debug!(ctx_id, "view closed; removing controls");
    let cleanup = handle
        .edit(
            ctx,
            poise::CreateReply::default()
                .embed(to_embed(&shown))
                .components(Vec::new()),
        )
        .await
        .map_err(Error::from);
    settle(outcome, cleanup)
}

async fn serve_view(
    ctx: Context<'_>,
    ctx_id: u64,
    view: &mut PagedView,
    shown: &mut DisplayUnit,
) -> Result<()> {
    loop {
        let prefix = format!("{ctx_id}:");
        let mut collector = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
            .filter(move |press| press.data.custom_id.starts_with(&prefix));
        if let Some(remaining) = view.remaining(Instant::now()) {
            if remaining.is_zero() {
                return Ok(());
            }
            collector = collector.timeout(remaining);
        }
        let Some(press) = collector.await else {
            return Ok(());
        };

        let action = action_from_id(ctx_id, &press.data.custom_id).unwrap_or_default();
        match view.handle_action(press.user.id.get(), action, Instant::now()) {
            ActionOutcome::Render(unit) => {
                press
                    .create_response(
                        ctx.serenity_context(),
                        serenity::CreateInteractionResponse::UpdateMessage(
                            serenity::CreateInteractionResponseMessage::new()
                                .embed(to_embed(&unit))
                                .components(controls(ctx_id, view)),
                        ),
                    )
                    .await?;
                *shown = unit;
            }
            ActionOutcome::Ignored(reason) => {
                debug!(user = %press.user.id, action, ?reason, "ignored view action");
                press
                    .create_response(
                        ctx.serenity_context(),
                        serenity::CreateInteractionResponse::Acknowledge,
                    )
                    .await?;
                if reason == IgnoreReason::Expired {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paginator::DisplayField;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 4), "abc…");
        assert_eq!(truncate_chars("ééééé", 3).chars().count(), 3);
    }

    #[test]
    fn test_button_ids_round_trip_only_for_own_invocation() {
        let id = button_id(42, NavAction::Next);
        assert_eq!(id, "42:next");
        assert_eq!(action_from_id(42, &id), Some("next"));
        assert_eq!(action_from_id(4, &id), None);
        assert_eq!(action_from_id(421, "421:prev"), Some("prev"));
        assert_eq!(action_from_id(42, "421:prev"), None);
    }

    #[test]
    fn test_labels_cover_every_action() {
        let labels: Vec<_> = NavAction::ALL.into_iter().map(button_label).collect();
        assert_eq!(labels, vec!["⏮", "◀", "▶", "⏭", "Toggle view"]);
    }

    #[test]
    fn test_embed_fields_are_clamped() {
        let unit = DisplayUnit {
            title: "t".repeat(400),
            description: None,
            fields: (0..30)
                .map(|i| DisplayField {
                    name: format!("#{i}"),
                    value: if i == 1 { " ".to_string() } else { "x".repeat(2000) },
                })
                .collect(),
            footer: "Page 1/1".to_string(),
        };
        let fields = embed_fields(&unit);
        assert_eq!(fields.len(), MAX_FIELDS);
        assert_eq!(fields[0].1.chars().count(), MAX_FIELD_VALUE);
        assert_eq!(fields[1].1, FALLBACK_VALUE);
        assert!(fields.iter().all(|(_, _, inline)| !inline));
    }

    fn talent_row(i: usize) -> String {
        format!(
            "[Talent {i}](https://docs.google.com/spreadsheets/d/1AbCdEfGhIjKlMnOpQrStUvWxYz0123456789abcdefgh/edit#gid=12345678&range=B{i}) - Pool {i} - Offense"
        )
    }

    #[test]
    fn test_long_chunk_is_split_between_whole_rows() {
        let rows: Vec<String> = (1..=10).map(talent_row).collect();
        assert!(rows.iter().all(|row| row.chars().count() > 120));
        let unit = DisplayUnit {
            title: "Talent pools: Offense, Defense".to_string(),
            description: None,
            fields: vec![DisplayField {
                name: "Talents".to_string(),
                value: rows.join("\n"),
            }],
            footer: "Page 1/1".to_string(),
        };

        let parts = fit_embed(&unit);
        assert!(parts.fields.len() > 1);
        assert!(parts.fields.iter().all(|(name, value, _)| {
            name == "Talents" && value.chars().count() <= MAX_FIELD_VALUE
        }));
        let shown: Vec<&str> = parts
            .fields
            .iter()
            .flat_map(|(_, value, _)| value.lines())
            .collect();
        assert_eq!(shown, rows);
    }

    #[test]
    fn test_single_line_longer_than_a_field_is_truncated() {
        let pieces = split_lines(&format!("short\n{}\nshort", "y".repeat(1500)), MAX_FIELD_VALUE);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[1].chars().count(), MAX_FIELD_VALUE);
        assert!(pieces[1].ends_with('…'));
    }

    #[test]
    fn test_embed_total_stays_within_limit() {
        let unit = DisplayUnit {
            title: "Trades".to_string(),
            description: Some("d".repeat(300)),
            fields: (0..25)
                .map(|i| DisplayField {
                    name: format!("Column {i}"),
                    value: "v".repeat(300),
                })
                .collect(),
            footer: "Page 3/9".to_string(),
        };
        let parts = fit_embed(&unit);
        assert_eq!(parts.fields.len(), 25);
        assert!(parts.total_chars() <= MAX_EMBED_TOTAL, "{}", parts.total_chars());
        assert_eq!(parts.footer, "Page 3/9");
        assert_eq!(parts.title, "Trades");
        assert!(parts.fields.iter().all(|(_, value, _)| !value.is_empty()));
    }

    #[test]
    fn test_small_embed_is_untouched() {
        let unit = DisplayUnit {
            title: "Solo fights".to_string(),
            description: Some("2 results".to_string()),
            fields: vec![DisplayField {
                name: "World".to_string(),
                value: "Aria".to_string(),
            }],
            footer: "Page 1/2".to_string(),
        };
        let parts = fit_embed(&unit);
        assert_eq!(parts.description.as_deref(), Some("2 results"));
        assert_eq!(parts.fields, vec![("World".to_string(), "Aria".to_string(), false)]);
    }
}
