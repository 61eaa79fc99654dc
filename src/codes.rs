//! Closed lookup tables for National Bridge Inventory survey codes.
//!
//! Every table is a fixed slice of `(code, label)` pairs. A code missing from
//! a table is a data-quality defect: callers get `None` back and decide how to
//! report it. Structure material and structure type tables serve both the
//! main structure and the approach spans.

pub const STATES: &[(u16, &str, &str)] = &[
    (1, "AL", "Alabama"),
    (2, "AK", "Alaska"),
    (4, "AZ", "Arizona"),
    (5, "AR", "Arkansas"),
    (6, "CA", "California"),
    (8, "CO", "Colorado"),
    (9, "CT", "Connecticut"),
    (10, "DE", "Delaware"),
    (11, "DC", "District of Columbia"),
    (12, "FL", "Florida"),
    (13, "GA", "Georgia"),
    (15, "HI", "Hawaii"),
    (16, "ID", "Idaho"),
    (17, "IL", "Illinois"),
    (18, "IN", "Indiana"),
    (19, "IA", "Iowa"),
    (20, "KS", "Kansas"),
    (21, "KY", "Kentucky"),
    (22, "LA", "Louisiana"),
    (23, "ME", "Maine"),
    (24, "MD", "Maryland"),
    (25, "MA", "Massachusetts"),
    (26, "MI", "Michigan"),
    (27, "MN", "Minnesota"),
    (28, "MS", "Mississippi"),
    (29, "MO", "Missouri"),
    (30, "MT", "Montana"),
    (31, "NE", "Nebraska"),
    (32, "NV", "Nevada"),
    (33, "NH", "New Hampshire"),
    (34, "NJ", "New Jersey"),
    (35, "NM", "New Mexico"),
    (36, "NY", "New York"),
    (37, "NC", "North Carolina"),
    (38, "ND", "North Dakota"),
    (39, "OH", "Ohio"),
    (40, "OK", "Oklahoma"),
    (41, "OR", "Oregon"),
    (42, "PA", "Pennsylvania"),
    (44, "RI", "Rhode Island"),
    (45, "SC", "South Carolina"),
    (46, "SD", "South Dakota"),
    (47, "TN", "Tennessee"),
    (48, "TX", "Texas"),
    (49, "UT", "Utah"),
    (50, "VT", "Vermont"),
    (51, "VA", "Virginia"),
    (53, "WA", "Washington"),
    (54, "WV", "West Virginia"),
    (55, "WI", "Wisconsin"),
    (56, "WY", "Wyoming"),
    (60, "AS", "American Samoa"),
    (64, "FM", "Federated States of Micronesia"),
    (66, "GU", "Guam"),
    (68, "MH", "Marshall Islands"),
    (69, "MP", "Commonwealth of the Northern Mariana Islands"),
    (70, "PW", "Palau"),
    (72, "PR", "Puerto Rico"),
    (74, "UM", "U.S. Minor Outlying Islands"),
    (78, "VI", "U.S. Virgin Islands"),
];

pub const OWNERS: &[(u16, &str)] = &[
    (1, "State Highway Agency"),
    (2, "County Highway Agency"),
    (3, "Town or Township Highway Agency"),
    (4, "City or Municipal Highway Agency"),
    (11, "State Park, Forest, or Reservation Agency"),
    (12, "Local Park, Forest, or Reservation Agency"),
    (21, "Other State Agencies"),
    (25, "Other Local Agencies"),
    (26, "Private (other than railroad)"),
    (27, "Railroad"),
    (31, "State Toll Authority"),
    (32, "Local Toll Authority"),
    (60, "Other Federal Agencies (not listed below)"),
    (61, "Indian Tribal Government"),
    (62, "Bureau of Indian Affairs"),
    (63, "Bureau of Fish and Wildlife"),
    (64, "U.S. Forest Service"),
    (66, "National Park Service"),
    (67, "Tennessee Valley Authority"),
    (68, "Bureau of Land Management"),
    (69, "Bureau of Reclamation"),
    (70, "Corps of Engineers (Civil)"),
    (71, "Corps of Engineers (Military)"),
    (72, "Air Force"),
    (73, "Navy/Marines"),
    (74, "Army"),
    (75, "NASA"),
    (76, "Metropolitan"),
];

pub const SERVICE_TYPES: &[(u16, &str)] = &[
    (0, "Other"),
    (1, "Highway"),
    (2, "Railroad"),
    (3, "Pedestrian-bicycle"),
    (4, "Highway-railroad"),
    (5, "Highway-pedestrian"),
    (6, "Overpass structure at an interchange"),
    (7, "Third level (Interchange)"),
    (8, "Fourth level (Interchange)"),
    (9, "Building or plaza"),
];

pub const MATERIALS: &[(u16, &str)] = &[
    (0, "Other"),
    (1, "Concrete"),
    (2, "Concrete continuous"),
    (3, "Steel"),
    (4, "Steel continuous"),
    (5, "Prestressed concrete (post-tension)"),
    (6, "Prestressed concrete continuous (post-tension)"),
    (7, "Wood or Timber"),
    (8, "Masonry"),
    (9, "Aluminum, Wrought Iron, or Cast Iron"),
];

pub const STRUCTURE_TYPES: &[(u16, &str)] = &[
    (0, "Other"),
    (1, "Slab"),
    (2, "Stringer/Multi-beam or Girder"),
    (3, "Girder and Floorbeam System"),
    (4, "Tee Beam"),
    (5, "Box Beam or Girders - Multiple"),
    (6, "Box Beam or Girders - Single or Spread"),
    (7, "Frame (except frame culverts)"),
    (8, "Orthotropic"),
    (9, "Truss - Deck"),
    (10, "Truss - Thru"),
    (11, "Arch - Deck"),
    (12, "Arch - Thru"),
    (13, "Suspension"),
    (14, "Stayed Girder"),
    (15, "Movable - Lift"),
    (16, "Movable - Bascule"),
    (17, "Movable - Swing"),
    (18, "Tunnel"),
    (19, "Culvert (includes frame culverts)"),
    (20, "Mixed types"),
    (21, "Segmental Box Girder"),
    (22, "Channel Beam"),
];

/// Rating labels indexed by rating value; index 10 is the unrated slot.
pub const RATING_LABELS: [&str; 11] = [
    "Failed",
    "Imminent Failure",
    "Critical",
    "Serious",
    "Poor",
    "Fair",
    "Satisfactory",
    "Good",
    "Very Good",
    "Excellent",
    "None",
];

/// Internal lookup key for an unrated structure.
pub const UNRATED_KEY: usize = 10;

fn lookup(table: &[(u16, &'static str)], code: u16) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, label)| *label)
}

pub fn state(code: u16) -> Option<(&'static str, &'static str)> {
    STATES
        .iter()
        .find(|(candidate, _, _)| *candidate == code)
        .map(|(_, abbrev, name)| (*abbrev, *name))
}

pub fn owner(code: u16) -> Option<&'static str> {
    lookup(OWNERS, code)
}

pub fn service_type(code: u16) -> Option<&'static str> {
    lookup(SERVICE_TYPES, code)
}

pub fn material(code: u16) -> Option<&'static str> {
    lookup(MATERIALS, code)
}

pub fn structure_type(code: u16) -> Option<&'static str> {
    lookup(STRUCTURE_TYPES, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_have_unique_codes() {
        for table in [OWNERS, SERVICE_TYPES, MATERIALS, STRUCTURE_TYPES] {
            let mut codes = table.iter().map(|(code, _)| *code).collect::<Vec<_>>();
            codes.sort_unstable();
            codes.dedup();
            assert_eq!(codes.len(), table.len());
        }
        let mut state_codes = STATES.iter().map(|(code, _, _)| *code).collect::<Vec<_>>();
        state_codes.dedup();
        assert_eq!(state_codes.len(), STATES.len());
    }

    #[test]
    fn lookups_resolve_known_codes_only() {
        assert_eq!(state(36), Some(("NY", "New York")));
        assert_eq!(state(3), None);
        assert_eq!(owner(27), Some("Railroad"));
        assert_eq!(owner(99), None);
        assert_eq!(service_type(0), Some("Other"));
        assert_eq!(material(7), Some("Wood or Timber"));
        assert_eq!(structure_type(22), Some("Channel Beam"));
        assert_eq!(structure_type(23), None);
    }

    #[test]
    fn unrated_slot_is_none() {
        assert_eq!(RATING_LABELS[UNRATED_KEY], "None");
        assert_eq!(RATING_LABELS[0], "Failed");
        assert_eq!(RATING_LABELS[9], "Excellent");
    }
}
