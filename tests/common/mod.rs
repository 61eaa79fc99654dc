#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use bridge_map::record::{BridgeRecord, RouteType, UNRATED, rating_label};
use tempfile::{TempDir, tempdir};

pub const RAW_HEADER: &str = "LATDD,LONGDD,STATE_CODE,COUNTY_COD,ROUTE_PREF,ROUTE_NUMB,\
FEATURES_D,OWNER_022,YEAR_BUILT,SERVICE_ON,STRUCTUR_2,STRUCTUR_3,APPR_KIND_,APPR_TYPE_,\
MAIN_UNIT_,APPR_SPANS,MAX_SPAN_L,STRUCTUR_4,DECK_WIDTH,STRUCTURAL,DECK_COND_,SUPERSTRUC,\
SUBSTRUCTU";

/// Interstate 95 over the Harlem River, New York County (36061), rated 6.
pub const RAW_NEW_YORK: &str =
    "40.8,-73.9,36,61,1,00095,'HARLEM RIVER',1,1965,1,3,2,1,1,3,2,45.5,120.0,30.2,6,7,6,5";
/// U.S. 40 in Franklin County, Ohio (39049), unrated.
pub const RAW_OHIO_UNRATED: &str =
    "39.9,-83.0,39,49,2,00040,'SCIOTO RIVER',1,1978,1,4,2,0,0,4,0,60.0,250.0,25.0,*,N,N,N";
/// City street; route class out of scope.
pub const RAW_CITY_STREET: &str =
    "41.0,-74.0,36,61,5,00012,'MAIN ST',4,1930,1,1,1,0,0,1,0,10.0,12.0,8.0,5,5,5,5";
/// Blank year built; incomplete.
pub const RAW_NO_YEAR: &str =
    "40.0,-75.0,36,1,1,00087,'CREEK',1,,1,1,1,0,0,1,0,10.0,12.0,8.0,5,5,5,5";
/// State code 99 is not in the state table.
pub const RAW_UNKNOWN_STATE: &str =
    "40.0,-75.0,99,1,1,00087,'CREEK',1,1950,1,1,1,0,0,1,0,10.0,12.0,8.0,5,5,5,5";
/// State route 215 in Salt Lake County, Utah (49035), rated 8.
pub const RAW_UTAH: &str =
    "40.7,-111.9,49,35,3,00215,'JORDAN RIVER',1,1990,1,5,4,1,1,2,1,30.0,70.5,20.0,8,8,8,7";

pub fn raw_csv(rows: &[&str]) -> String {
    let mut contents = String::from(RAW_HEADER);
    contents.push('\n');
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    contents
}

/// All six sample rows: three normalize, one is out of scope, one is
/// incomplete and one fails the state lookup.
pub fn sample_raw_csv() -> String {
    raw_csv(&[
        RAW_NEW_YORK,
        RAW_OHIO_UNRATED,
        RAW_CITY_STREET,
        RAW_NO_YEAR,
        RAW_UNKNOWN_STATE,
        RAW_UTAH,
    ])
}

/// A rated slab bridge on an interstate; tests adjust fields as needed.
pub fn bridge(region_id: &str, state_name: &str, rating: i8) -> BridgeRecord {
    BridgeRecord {
        region_id: region_id.to_string(),
        state_abbrev: state_name.chars().take(2).collect::<String>().to_uppercase(),
        state_name: state_name.to_string(),
        latitude: 40.0,
        longitude: -74.0,
        route_type: RouteType::Interstate,
        route_number: "95".to_string(),
        feature_intersect: "CREEK".to_string(),
        owner: "State Highway Agency".to_string(),
        year_built: 1970,
        service_type: "Highway".to_string(),
        bridge_material: "Concrete".to_string(),
        bridge_type: "Slab".to_string(),
        approach_material: "Concrete".to_string(),
        approach_type: "Slab".to_string(),
        num_spans: 3,
        num_approach_spans: 0,
        max_span_length: 12.0,
        bridge_length: 40.0,
        bridge_width: 15.0,
        eval_rating: rating,
        eval_rating_verbose: rating_label(rating).unwrap_or("None").to_string(),
        deck_condition: Some(7),
        superstructure_condition: Some(7),
        substructure_condition: Some(6),
    }
}

pub fn unrated(region_id: &str, state_name: &str) -> BridgeRecord {
    bridge(region_id, state_name, UNRATED)
}

/// A small multi-state dataset covering every selector dimension.
pub fn sample_bridges() -> Vec<BridgeRecord> {
    vec![
        BridgeRecord {
            latitude: 40.8,
            longitude: -73.9,
            ..bridge("36061", "New York", 6)
        },
        BridgeRecord {
            latitude: 40.6,
            longitude: -73.9,
            route_number: "278".to_string(),
            bridge_length: 900.0,
            ..bridge("36047", "New York", 4)
        },
        BridgeRecord {
            route_type: RouteType::UsNumbered,
            route_number: "40".to_string(),
            year_built: 1935,
            bridge_type: "Tee Beam".to_string(),
            ..bridge("39049", "Ohio", 8)
        },
        BridgeRecord {
            route_type: RouteType::UsNumbered,
            route_number: "40".to_string(),
            ..unrated("39049", "Ohio")
        },
        BridgeRecord {
            latitude: 40.7,
            longitude: -111.9,
            route_type: RouteType::State,
            route_number: "215".to_string(),
            num_spans: 12,
            bridge_length: 0.0,
            ..bridge("49035", "Utah", 2)
        },
    ]
}

/// Serializes records the way the `clean` command writes them.
pub fn clean_csv(records: &[BridgeRecord]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record).expect("serialize bridge");
    }
    String::from_utf8(writer.into_inner().expect("flush csv")).expect("utf-8 csv")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
