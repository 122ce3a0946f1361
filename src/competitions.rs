//! Registry of supported competition feeds.
//!
//! The primary upstream has no "all matches by date" endpoint; aggregation
//! queries each competition's own feed and filters client-side. This is the
//! fixed set the engine knows about; the active subset comes from
//! configuration.

/// (feed id, display name, country)
pub const SUPPORTED: &[(u32, &str, &str)] = &[
    (47, "Premier League", "England"),
    (87, "LaLiga", "Spain"),
    (54, "Bundesliga", "Germany"),
    (55, "Serie A", "Italy"),
    (53, "Ligue 1", "France"),
    (42, "Champions League", "Europe"),
    (73, "Europa League", "Europe"),
    (48, "Championship", "England"),
    (57, "Eredivisie", "Netherlands"),
    (61, "Liga Portugal", "Portugal"),
    (130, "MLS", "USA"),
    (268, "Brasileirão", "Brazil"),
    (536, "Saudi Pro League", "Saudi Arabia"),
    (112, "Copa Libertadores", "South America"),
];

/// Feed ids of every supported competition, in registry order.
pub fn default_ids() -> Vec<u32> {
    SUPPORTED.iter().map(|(id, _, _)| *id).collect()
}

/// Display name for a competition id, if it is in the registry.
pub fn name_of(id: u32) -> Option<&'static str> {
    SUPPORTED
        .iter()
        .find(|(cid, _, _)| *cid == id)
        .map(|(_, name, _)| *name)
}

/// Resolve the active competition set: an explicit non-empty selection wins,
/// otherwise the full registry.
pub fn active_ids(selected: &[u32]) -> Vec<u32> {
    if selected.is_empty() {
        default_ids()
    } else {
        selected.to_vec()
    }
}
