//! Tier Identifier Resolution
//!
//! Maps a (rank, division) pair to the numeric tier id used to look up a
//! display asset. Resolution is a pure, total function: any rank string and
//! any division string produce a defined id without erroring.
//!
//! Each divisioned rank owns a contiguous block of [`DIVISION_COUNT`]
//! consecutive ids starting at its base id; the two endpoint ranks map to
//! one fixed id each, independent of division.

use super::rank::Rank;

/// Divisions per divisioned rank.
pub const DIVISION_COUNT: u32 = 3;

/// Tier id of the lowest endpoint (`Unranked`).
pub const UNRANKED_TIER_ID: u32 = 0;

/// Tier id of the highest endpoint (`Radiant`).
pub const RADIANT_TIER_ID: u32 = 27;

/// Tier id resolved for anything unrecognized. Same as `Unranked`.
pub const FALLBACK_TIER_ID: u32 = UNRANKED_TIER_ID;

/// Asset location template; `{id}` is replaced with the tier id.
pub const DEFAULT_ICON_URL_TEMPLATE: &str =
    "https://trackercdn.com/cdn/tracker.gg/valorant/icons/tiers/{id}.png";

/// First tier id of a divisioned rank's 3-id block, `None` for endpoints.
pub const fn base_id(rank: Rank) -> Option<u32> {
    match rank {
        Rank::Unranked | Rank::Radiant => None,
        Rank::Iron => Some(3),
        Rank::Bronze => Some(6),
        Rank::Silver => Some(9),
        Rank::Gold => Some(12),
        Rank::Platinum => Some(15),
        Rank::Diamond => Some(18),
        Rank::Ascendant => Some(21),
        Rank::Immortal => Some(24),
    }
}

/// Parse a division label into its numeric value.
///
/// Absent, non-numeric, and zero all parse to `1`. Values above
/// [`DIVISION_COUNT`] are passed through unclamped; callers that hand in
/// `"9"` get a tier id past the rank's own block.
pub fn parse_division(division: Option<&str>) -> u32 {
    let Some(raw) = division else { return 1 };
    let trimmed = raw.trim();
    let digits: &str = match trimmed.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(value) => value,
    }
}

/// Resolve a validated rank and a raw division label to a tier id.
#[inline]
pub fn resolve_rank(rank: Rank, division: Option<&str>) -> u32 {
    match base_id(rank) {
        Some(base) => base.saturating_add(parse_division(division) - 1),
        None => match rank {
            Rank::Radiant => RADIANT_TIER_ID,
            _ => UNRANKED_TIER_ID,
        },
    }
}

/// Resolve raw rank and division strings to a tier id.
///
/// Total over arbitrary input: an unrecognized rank resolves exactly as
/// `Unranked` would.
#[inline]
pub fn resolve(rank: &str, division: Option<&str>) -> u32 {
    resolve_rank(Rank::from_name(rank), division)
}

/// Asset URL for a tier id, using the default template.
pub fn icon_url(tier_id: u32) -> String {
    icon_url_with(DEFAULT_ICON_URL_TEMPLATE, tier_id)
}

/// Asset URL for a tier id, using a caller-supplied template.
///
/// The template's `{id}` marker is replaced; a template without the marker
/// comes back unchanged, which callers should treat as the placeholder
/// case rather than a fault.
pub fn icon_url_with(template: &str, tier_id: u32) -> String {
    template.replace("{id}", &tier_id.to_string())
}
