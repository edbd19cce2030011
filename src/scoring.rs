use crate::models::{Decision, RdcIdeaFields};

const MAX_RATING: u32 = 5;
const IMPLEMENT_THRESHOLD: u32 = 81;
const ADJUST_THRESHOLD: u32 = 41;

/// Permissive numeric parse for a rating field. The UI hands over raw
/// text while the user is still typing, so commas count as decimal
/// separators, whitespace is ignored, and anything unparsable becomes 0.
pub fn parse_rating(raw: &str) -> i64 {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return 0;
    }
    normalized.parse::<f64>().map(|value| value.trunc() as i64).unwrap_or(0)
}

/// Clamp an edited rating into [1, 5], with one carve-out: an empty field
/// or a literal zero stays 0 so a half-filled row does not get forced to 1
/// under the user's cursor.
pub fn clamp_rating(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let parsed = parse_rating(raw);
    if parsed > MAX_RATING as i64 {
        return MAX_RATING;
    }
    if parsed < 1 {
        if trimmed.is_empty() || trimmed == "0" {
            return 0;
        }
        return 1;
    }
    parsed as u32
}

pub fn score(resolution: u32, demand: u32, competition: u32) -> u32 {
    resolution * demand * competition
}

pub fn decide(resolution: u32, demand: u32, competition: u32) -> Decision {
    if resolution == 0 || demand == 0 || competition == 0 {
        return Decision::FillInFactors;
    }
    let total = score(resolution, demand, competition);
    if total >= IMPLEMENT_THRESHOLD {
        Decision::ImplementNow
    } else if total >= ADJUST_THRESHOLD {
        Decision::AdjustAndTest
    } else {
        Decision::DiscardAndRedirect
    }
}

/// Recompute the derived fields in place. Stored factors above the cap are
/// pulled back to 5 so a bad row loaded from the store self-heals on the
/// next edit.
pub fn apply_scoring(idea: &mut RdcIdeaFields) {
    idea.resolution = idea.resolution.min(MAX_RATING);
    idea.demand = idea.demand.min(MAX_RATING);
    idea.competition = idea.competition.min(MAX_RATING);
    idea.score = score(idea.resolution, idea.demand, idea.competition);
    idea.decision = Some(decide(idea.resolution, idea.demand, idea.competition));
}
