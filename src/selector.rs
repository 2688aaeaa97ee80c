//! Card disambiguation.
//!
//! A name + number search can return the same card from several sets. The
//! user's collection size (the printed total) picks between them. Rules are
//! tried in order and the first that resolves wins:
//!
//! 1. every candidate with a set id shares the same one → first candidate
//! 2. exactly one candidate has `printed_total == target`, or several do and
//!    they share one set id → first of those
//! 3. same as 2, but with `|printed_total - target| <= 1`
//!
//! Anything else is ambiguous. Candidates without a set id take part in the
//! numeric filters but are ignored when counting distinct set ids.

use std::collections::HashSet;

use tracing::info;

use crate::types::Card;

/// How far the printed total may drift from the target in the last rule.
const PRINTED_TOTAL_TOLERANCE: i64 = 1;

/// Which rule resolved a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    /// Rule 1: all candidates with a set id share it.
    UniformSet,
    /// Rule 2: exactly one candidate has the target printed total.
    ExactTotal,
    /// Rule 2: several exact matches, all from one set.
    ExactTotalSameSet,
    /// Rule 3: exactly one candidate within the tolerance.
    NearTotal,
    /// Rule 3: several candidates within the tolerance, all from one set.
    NearTotalSameSet,
}

/// Pick one card out of `candidates` for a collection of `target_total`.
pub fn select(candidates: &[Card], target_total: u32) -> Option<&Card> {
    select_with_rule(candidates, target_total).map(|(card, _)| card)
}

/// Like [`select`], also reporting which rule decided.
pub fn select_with_rule(
    candidates: &[Card],
    target_total: u32,
) -> Option<(&Card, SelectionRule)> {
    let target = i64::from(target_total);

    if distinct_set_ids(candidates.iter()) == 1 {
        return decided(&candidates[0], SelectionRule::UniformSet);
    }

    let exact: Vec<&Card> = candidates
        .iter()
        .filter(|c| c.printed_total() == Some(target))
        .collect();
    if let Some(pick) = pick_from(
        &exact,
        SelectionRule::ExactTotal,
        SelectionRule::ExactTotalSameSet,
    ) {
        return Some(pick);
    }

    let near: Vec<&Card> = candidates
        .iter()
        .filter(|c| {
            c.printed_total()
                .is_some_and(|t| (t - target).abs() <= PRINTED_TOTAL_TOLERANCE)
        })
        .collect();
    pick_from(&near, SelectionRule::NearTotal, SelectionRule::NearTotalSameSet)
}

fn pick_from<'a>(
    subset: &[&'a Card],
    single: SelectionRule,
    same_set: SelectionRule,
) -> Option<(&'a Card, SelectionRule)> {
    match subset {
        [] => None,
        [only] => decided(*only, single),
        [first, ..] if distinct_set_ids(subset.iter().copied()) == 1 => {
            decided(*first, same_set)
        }
        _ => None,
    }
}

fn decided(card: &Card, rule: SelectionRule) -> Option<(&Card, SelectionRule)> {
    info!(?rule, card = %card.name, set = card.set_id().unwrap_or("-"), "card selected");
    Some((card, rule))
}

fn distinct_set_ids<'a>(cards: impl Iterator<Item = &'a Card>) -> usize {
    cards.filter_map(Card::set_id).collect::<HashSet<_>>().len()
}
