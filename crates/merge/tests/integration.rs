//! End-to-end merge runs: TOML config + CSV text in, merged table out.

use std::collections::HashMap;

use foodscape_merge::{load_table, run, MergeConfig, MergeInput};

const SNAP_CSV: &str = "\
RECORD_ID,STORE_NAME,STORE_STREET_ADDRESS,CITY,STATE,ZIP_CODE,COUNTY,STORE_TYPE,LATITUDE,LONGITUDE
1001,FIESTA MART 12,2940 W NORTHWEST HWY,DALLAS,TX,75220,DALLAS,Supermarket,32.8601,-96.8785
1002,LA MICHOACANA MEAT MARKET,4811 COLUMBIA AVE,DALLAS,TX,75214,DALLAS,Meat Market,32.8021,-96.7651
";

const PERMITS_CSV: &str = "\
OUTLET_NAME,OUTLET_ADDRESS,OUTLET_CITY,OUTLET_STATE,OUTLET_ZIP_CODE,OUTLET_NAICS_CODE,OUTLET_COUNTY_CODE,LATITUDE,LONGITUDE
FIESTA MART 12,2940 W NORTHWEST HWY,DALLAS,TX,75220,445110.0,57.0,32.8601,-96.8785
PHO SAIGON MARKET,1111 E BELT LINE RD,RICHARDSON,TX,75081,445110.0,57.0,32.9512,-96.7012
JOE'S LIQUOR,200 MAIN ST,DALLAS,TX,75201,445310.0,57.0,32.7812,-96.7989
NO COORDS GROCERY,300 OAK ST,DALLAS,TX,75204,445110.0,57.0,,
FAR AWAY FOODS,1 DESERT RD,EL PASO,TX,79901,445110.0,57.0,31.7619,-106.4850
NAIL SALON,400 ELM ST,DALLAS,TX,75202,812113.0,57.0,32.7810,-96.8001
";

const APPEND_CONFIG: &str = r#"
name = "SNAP + sales tax permits"
kind = "append"

[sources.base]
file = "snap.csv"
key = ["STORE_STREET_ADDRESS", "CITY", "STATE"]

[sources.incoming]
file = "permits.csv"
key = ["OUTLET_ADDRESS", "OUTLET_CITY", "OUTLET_STATE"]

[[sources.incoming.filter]]
column = "OUTLET_NAICS_CODE"
prefix = "445"

[sources.incoming.map]
OUTLET_NAME = "STORE_NAME"
OUTLET_ADDRESS = "STORE_STREET_ADDRESS"
OUTLET_CITY = "CITY"
OUTLET_STATE = "STATE"
OUTLET_ZIP_CODE = "ZIP_CODE"
LATITUDE = "LATITUDE"
LONGITUDE = "LONGITUDE"

[sources.incoming.defaults]
COUNTY = "DALLAS"

[naics]
column = "OUTLET_NAICS_CODE"
into = "STORE_TYPE"

[naics.map]
"445110" = "Supermarket"
"445120" = "Convenience Store"
"445310" = "Liquor Store"

[bounds]
lat_column = "LATITUDE"
lon_column = "LONGITUDE"
lat_min = 32.0
lat_max = 33.5
lon_min = -97.5
lon_max = -96.0

[id]
column = "RECORD_ID"
"#;

fn append_input() -> MergeInput {
    MergeInput {
        tables: HashMap::from([
            ("base".to_string(), load_table("base", SNAP_CSV).unwrap()),
            (
                "incoming".to_string(),
                load_table("incoming", PERMITS_CSV).unwrap(),
            ),
        ]),
    }
}

#[test]
fn append_end_to_end() {
    let config = MergeConfig::from_toml(APPEND_CONFIG).unwrap();
    let result = run(&config, &append_input()).unwrap();

    let s = &result.summary;
    assert_eq!(s.base_rows, 2);
    // Nail salon is filtered by the NAICS prefix.
    assert_eq!(s.filtered_out, 1);
    assert_eq!(s.incoming_rows, 5);
    // Fiesta Mart shares its address key with the base.
    assert_eq!(s.matched_existing, 1);
    assert_eq!(s.dropped_missing_coords, 1);
    assert_eq!(s.dropped_out_of_bounds, 1);
    // Pho Saigon Market and Joe's Liquor survive everything.
    assert_eq!(s.appended, 2);
    assert_eq!(s.output_rows, 4);

    assert_eq!(result.meta.kind, "append");

    // Output schema equals the base schema.
    let table = &result.table;
    assert_eq!(table.headers[0], "RECORD_ID");
    assert_eq!(table.headers.len(), 10);

    let name_idx = table.column("STORE_NAME").unwrap();
    let type_idx = table.column("STORE_TYPE").unwrap();
    let county_idx = table.column("COUNTY").unwrap();
    let id_idx = table.column("RECORD_ID").unwrap();

    let pho = table
        .records
        .iter()
        .find(|r| r[name_idx] == "PHO SAIGON MARKET")
        .expect("appended row present");
    assert_eq!(pho[type_idx], "Supermarket"); // 445110.0 -> Supermarket
    assert_eq!(pho[county_idx], "DALLAS"); // default fill
    assert!(!pho[id_idx].is_empty());
    assert!(pho[id_idx].chars().all(|c| c.is_ascii_digit()));

    let liquor = table
        .records
        .iter()
        .find(|r| r[name_idx] == "JOE'S LIQUOR")
        .unwrap();
    assert_eq!(liquor[type_idx], "Liquor Store");
}

#[test]
fn append_without_bounds_keeps_coordless_rows() {
    let mut config_str = APPEND_CONFIG.to_string();
    let bounds_start = config_str.find("[bounds]").unwrap();
    let id_start = config_str.find("[id]").unwrap();
    config_str.replace_range(bounds_start..id_start, "");

    let config = MergeConfig::from_toml(&config_str).unwrap();
    let result = run(&config, &append_input()).unwrap();

    let s = &result.summary;
    assert_eq!(s.dropped_missing_coords, 0);
    assert_eq!(s.dropped_out_of_bounds, 0);
    assert_eq!(s.appended, 4);
}

#[test]
fn append_reports_duplicate_base_keys() {
    let snap_dup = "\
RECORD_ID,STORE_NAME,STORE_STREET_ADDRESS,CITY,STATE,ZIP_CODE,COUNTY,STORE_TYPE,LATITUDE,LONGITUDE
1,A,2940 W NORTHWEST HWY,DALLAS,TX,75220,DALLAS,Supermarket,32.8,-96.8
2,B,2940 W NORTHWEST HWY,DALLAS,TX,75220,DALLAS,Supermarket,32.8,-96.8
";
    let config = MergeConfig::from_toml(APPEND_CONFIG).unwrap();
    let input = MergeInput {
        tables: HashMap::from([
            ("base".to_string(), load_table("base", snap_dup).unwrap()),
            (
                "incoming".to_string(),
                load_table("incoming", PERMITS_CSV).unwrap(),
            ),
        ]),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.summary.duplicate_keys.get("base"), Some(&1));
}

#[test]
fn append_missing_mapped_column_is_an_error() {
    let config = MergeConfig::from_toml(APPEND_CONFIG).unwrap();
    let permits_missing = "\
OUTLET_NAME,OUTLET_CITY,OUTLET_STATE,OUTLET_ZIP_CODE,OUTLET_NAICS_CODE,OUTLET_COUNTY_CODE,LATITUDE,LONGITUDE
X,DALLAS,TX,75220,445110,57,32.8,-96.8
";
    let input = MergeInput {
        tables: HashMap::from([
            ("base".to_string(), load_table("base", SNAP_CSV).unwrap()),
            (
                "incoming".to_string(),
                load_table("incoming", permits_missing).unwrap(),
            ),
        ]),
    };
    let err = run(&config, &input).unwrap_err();
    assert!(err.to_string().contains("OUTLET_ADDRESS"));
}

// ---------------------------------------------------------------------------
// Enrich
// ---------------------------------------------------------------------------

const FOOD_CSV: &str = "\
STORE_NAME,STORE_STREET_ADDRESS,CITY
FIESTA MART 12,2940 W NORTHWEST HWY,DALLAS
CORNER STORE,999 UNKNOWN RD,DALLAS
";

const PROPERTY_CSV: &str = "\
ACCOUNT_NUM,STREET_NUM,FULL_STREET_NAME,PROPERTY_CITY,BLDG_CLASS_DESC,GROSS_BLDG_AREA
A1,2940,W NORTHWEST HWY,DALLAS,RETAIL,45000
A2,123,ELM ST,DALLAS,OFFICE,12000
";

const ENRICH_CONFIG: &str = r#"
name = "Property detail"
kind = "enrich"

[sources.base]
file = "food.csv"
key = ["STORE_STREET_ADDRESS", "CITY"]

[sources.detail]
file = "property.csv"
key = ["STREET_NUM", "FULL_STREET_NAME", "PROPERTY_CITY"]
take = ["BLDG_CLASS_DESC", "GROSS_BLDG_AREA"]
"#;

#[test]
fn enrich_end_to_end() {
    let config = MergeConfig::from_toml(ENRICH_CONFIG).unwrap();
    let input = MergeInput {
        tables: HashMap::from([
            ("base".to_string(), load_table("base", FOOD_CSV).unwrap()),
            (
                "detail".to_string(),
                load_table("detail", PROPERTY_CSV).unwrap(),
            ),
        ]),
    };
    let result = run(&config, &input).unwrap();

    let s = &result.summary;
    assert_eq!(s.base_rows, 2);
    assert_eq!(s.enriched, 1);
    assert_eq!(s.unmatched_base, 1);
    assert_eq!(s.output_rows, 2);

    let table = &result.table;
    assert_eq!(
        table.headers,
        vec![
            "STORE_NAME",
            "STORE_STREET_ADDRESS",
            "CITY",
            "BLDG_CLASS_DESC",
            "GROSS_BLDG_AREA"
        ]
    );

    // The matched base row carries the detail cells; the other is padded.
    assert_eq!(table.records[0][3], "RETAIL");
    assert_eq!(table.records[0][4], "45000");
    assert_eq!(table.records[1][3], "");
    assert_eq!(table.records[1][4], "");
}

#[test]
fn enrich_takes_all_non_key_columns_by_default() {
    let config_str = ENRICH_CONFIG.replace(
        "take = [\"BLDG_CLASS_DESC\", \"GROSS_BLDG_AREA\"]",
        "",
    );
    let config = MergeConfig::from_toml(&config_str).unwrap();
    let input = MergeInput {
        tables: HashMap::from([
            ("base".to_string(), load_table("base", FOOD_CSV).unwrap()),
            (
                "detail".to_string(),
                load_table("detail", PROPERTY_CSV).unwrap(),
            ),
        ]),
    };
    let result = run(&config, &input).unwrap();

    // ACCOUNT_NUM plus the two detail columns; key columns excluded.
    assert_eq!(
        result.table.headers,
        vec![
            "STORE_NAME",
            "STORE_STREET_ADDRESS",
            "CITY",
            "ACCOUNT_NUM",
            "BLDG_CLASS_DESC",
            "GROSS_BLDG_AREA"
        ]
    );
}

#[test]
fn enrich_first_detail_match_wins_and_duplicates_are_counted() {
    let property_dup = "\
ACCOUNT_NUM,STREET_NUM,FULL_STREET_NAME,PROPERTY_CITY,BLDG_CLASS_DESC,GROSS_BLDG_AREA
A1,2940,W NORTHWEST HWY,DALLAS,RETAIL,45000
A9,2940,W NORTHWEST HWY,DALLAS,WAREHOUSE,90000
";
    let config = MergeConfig::from_toml(ENRICH_CONFIG).unwrap();
    let input = MergeInput {
        tables: HashMap::from([
            ("base".to_string(), load_table("base", FOOD_CSV).unwrap()),
            (
                "detail".to_string(),
                load_table("detail", property_dup).unwrap(),
            ),
        ]),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.summary.duplicate_keys.get("detail"), Some(&1));
    assert_eq!(result.table.records[0][3], "RETAIL");
}

#[test]
fn missing_source_table_is_an_error() {
    let config = MergeConfig::from_toml(ENRICH_CONFIG).unwrap();
    let input = MergeInput {
        tables: HashMap::from([("base".to_string(), load_table("base", FOOD_CSV).unwrap())]),
    };
    let err = run(&config, &input).unwrap_err();
    assert!(err.to_string().contains("detail"));
}
