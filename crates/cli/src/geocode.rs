//! `fscape geocode` — batch-geocode outlet addresses via the Census
//! Bureau batch geocoder.
//!
//! Submits `id,street,city,state,zip` batches as a multipart form to
//! `/geocoder/locations/addressbatch` and joins the returned coordinates
//! back onto the input by id. Unmatched or coordinate-less responses
//! produce empty cells and a warning, never row loss.

use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::exit_codes::{
    EXIT_GEOCODE_RATE_LIMIT, EXIT_GEOCODE_UPSTREAM, EXIT_GEOCODE_VALIDATION,
};
use crate::util::{find_column, open_output, read_input};
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

const CENSUS_BASE_URL: &str = "https://geocoding.geo.census.gov";
const BATCH_PATH: &str = "/geocoder/locations/addressbatch";
pub(crate) const DEFAULT_BENCHMARK: &str = "Public_AR_Current";

/// Service limit on addresses per batch file.
const BATCH_LIMIT: usize = 10_000;
const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = concat!("fscape/", env!("CARGO_PKG_VERSION"));

/// Columns appended to every row, in order.
const RESULT_COLUMNS: [&str; 4] = [
    "LATITUDE",
    "LONGITUDE",
    "GEOCODE_MATCH",
    "GEOCODE_MATCH_TYPE",
];

// ── Client ──────────────────────────────────────────────────────────

/// Census geocoder client with retry + backoff. No auth required.
pub(crate) struct GeocodeClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl GeocodeClient {
    pub(crate) fn new() -> Self {
        Self::with_base_url(CENSUS_BASE_URL.to_string())
    }

    pub(crate) fn with_base_url(base_url: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self { http, base_url }
    }

    /// Submit one address batch, returning the raw response CSV.
    pub(crate) fn submit_batch(
        &self,
        batch_csv: &str,
        benchmark: &str,
    ) -> Result<String, CliError> {
        let url = format!("{}{}", self.base_url, BATCH_PATH);
        let mut backoff_secs = 1u64;

        for attempt in 0..=MAX_RETRIES {
            // The form is consumed per request, so it is rebuilt per attempt.
            let part = reqwest::blocking::multipart::Part::bytes(batch_csv.as_bytes().to_vec())
                .file_name("addresses.csv")
                .mime_str("text/csv")
                .map_err(|e| CliError::io(format!("cannot build address part: {}", e)))?;
            let form = reqwest::blocking::multipart::Form::new()
                .text("benchmark", benchmark.to_string())
                .text("returntype", "locations")
                .part("addressFile", part);

            match self.http.post(&url).multipart(form).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Bad batch: fail immediately
                    if status == 400 {
                        return Err(CliError {
                            code: EXIT_GEOCODE_VALIDATION,
                            message: "geocoder rejected the batch (HTTP 400)".into(),
                            hint: Some(
                                "check the address/city/state/zip column flags".into(),
                            ),
                        });
                    }

                    // Other 4xx (not 429): fail immediately
                    if status >= 400 && status < 500 && status != 429 {
                        return Err(CliError {
                            code: EXIT_GEOCODE_UPSTREAM,
                            message: format!("geocoder error (HTTP {})", status),
                            hint: None,
                        });
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if attempt == MAX_RETRIES {
                            let (code, what) = if status == 429 {
                                (EXIT_GEOCODE_RATE_LIMIT, "rate limited")
                            } else {
                                (EXIT_GEOCODE_UPSTREAM, "upstream error")
                            };
                            return Err(CliError {
                                code,
                                message: format!(
                                    "geocoder {} after {} attempts (HTTP {})",
                                    what, MAX_RETRIES, status,
                                ),
                                hint: None,
                            });
                        }

                        let wait = if status == 429 {
                            resp.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(backoff_secs)
                        } else {
                            backoff_secs
                        };

                        eprintln!(
                            "warning: retry {}/{} in {}s (HTTP {})",
                            attempt + 1,
                            MAX_RETRIES,
                            wait,
                            status,
                        );
                        thread::sleep(Duration::from_secs(wait));
                        backoff_secs *= 2;
                        continue;
                    }

                    return resp.text().map_err(|e| CliError {
                        code: EXIT_GEOCODE_UPSTREAM,
                        message: format!("failed to read geocoder response: {}", e),
                        hint: None,
                    });
                }
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(CliError {
                            code: EXIT_GEOCODE_UPSTREAM,
                            message: format!(
                                "geocoder unreachable after {} attempts: {}",
                                MAX_RETRIES, e,
                            ),
                            hint: None,
                        });
                    }
                    eprintln!(
                        "warning: retry {}/{} in {}s ({})",
                        attempt + 1,
                        MAX_RETRIES,
                        backoff_secs,
                        e,
                    );
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }

        unreachable!()
    }
}

// ── Response parsing ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub(crate) struct GeocodeHit {
    pub latitude: String,
    pub longitude: String,
    pub match_status: String,
    pub match_type: String,
}

/// Parse the 8-column batch response:
/// id, input address, match status, match type, matched address,
/// "lon,lat" pair, TIGER line id, side. Non-matches come back with fewer
/// columns, so parsing is lenient; rows without coordinates produce empty
/// lat/lon cells.
pub(crate) fn parse_response(body: &str) -> Result<HashMap<String, GeocodeHit>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut hits = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| CliError {
            code: EXIT_GEOCODE_UPSTREAM,
            message: format!("cannot parse geocoder response: {}", e),
            hint: None,
        })?;

        let id = match record.get(0) {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => continue,
        };

        let (longitude, latitude) = record
            .get(5)
            .and_then(|pair| pair.split_once(','))
            .map(|(lon, lat)| (lon.trim().to_string(), lat.trim().to_string()))
            .unwrap_or_default();

        hits.insert(
            id,
            GeocodeHit {
                latitude,
                longitude,
                match_status: record.get(2).unwrap_or("").to_string(),
                match_type: record.get(3).unwrap_or("").to_string(),
            },
        );
    }

    Ok(hits)
}

// ── Batch construction ──────────────────────────────────────────────

/// One address row headed for the batch file.
struct BatchAddress {
    id: String,
    street: String,
    city: String,
    state: String,
    zip: String,
}

/// Headerless `id,street,city,state,zip` CSV, as the geocoder expects.
fn build_batch_csv(addresses: &[BatchAddress]) -> Result<String, CliError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        for addr in addresses {
            writer
                .write_record([&addr.id, &addr.street, &addr.city, &addr.state, &addr.zip])
                .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
        }
        writer
            .flush()
            .map_err(|e| CliError::io(format!("CSV flush error: {}", e)))?;
    }
    String::from_utf8(buf).map_err(|e| CliError::io(format!("batch encoding error: {}", e)))
}

// ── Main command ────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_geocode(
    input: Option<PathBuf>,
    id_col: Option<String>,
    address_col: String,
    city_col: String,
    state_col: String,
    zip_col: String,
    benchmark: String,
    base_url: Option<String>,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let data = read_input(&input)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CliError::args(format!("cannot read CSV header: {}", e)))?
        .clone();

    let column = |name: &str| -> Result<usize, CliError> {
        find_column(&headers, name).ok_or_else(|| {
            CliError::args(format!("input has no '{}' column", name))
                .with_hint("set the --address-col/--city-col/--state-col/--zip-col flags")
        })
    };
    let address_idx = column(&address_col)?;
    let city_idx = column(&city_col)?;
    let state_idx = column(&state_col)?;
    let zip_idx = column(&zip_col)?;
    let id_idx = match &id_col {
        Some(name) => Some(column(name)?),
        None => None,
    };

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| CliError::args(format!("CSV parse error: {}", e)))?;

    let addresses: Vec<BatchAddress> = records
        .iter()
        .enumerate()
        .map(|(row, record)| BatchAddress {
            id: match id_idx {
                Some(i) => record.get(i).unwrap_or("").trim().to_string(),
                None => row.to_string(),
            },
            street: record.get(address_idx).unwrap_or("").to_string(),
            city: record.get(city_idx).unwrap_or("").to_string(),
            state: record.get(state_idx).unwrap_or("").to_string(),
            zip: record.get(zip_idx).unwrap_or("").to_string(),
        })
        .collect();

    let client = match base_url {
        Some(url) => GeocodeClient::with_base_url(url),
        None => GeocodeClient::new(),
    };

    let batches = addresses.chunks(BATCH_LIMIT).collect::<Vec<_>>();
    let mut hits: HashMap<String, GeocodeHit> = HashMap::new();
    for (i, batch) in batches.iter().enumerate() {
        if !quiet {
            eprintln!("batch {}/{}: {} address(es)", i + 1, batches.len(), batch.len());
        }
        let batch_csv = build_batch_csv(batch)?;
        let body = client.submit_batch(&batch_csv, &benchmark)?;
        hits.extend(parse_response(&body)?);
    }

    // Join results back onto the input by id.
    let writer = open_output(&output)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut out_headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out_headers.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));
    csv_writer
        .write_record(&out_headers)
        .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;

    let mut matched = 0usize;
    let mut unmatched = 0usize;
    let empty_hit = GeocodeHit::default();
    for (record, addr) in records.iter().zip(&addresses) {
        let hit = hits.get(&addr.id).unwrap_or(&empty_hit);
        if hit.latitude.is_empty() {
            unmatched += 1;
        } else {
            matched += 1;
        }

        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(headers.len(), String::new());
        row.push(hit.latitude.clone());
        row.push(hit.longitude.clone());
        row.push(hit.match_status.clone());
        row.push(hit.match_type.clone());
        csv_writer
            .write_record(&row)
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    }
    csv_writer
        .flush()
        .map_err(|e| CliError::io(format!("CSV flush error: {}", e)))?;

    if !quiet {
        eprintln!(
            "geocoded {} address(es) — {} matched, {} unmatched",
            addresses.len(),
            matched,
            unmatched,
        );
        if unmatched > 0 {
            eprintln!("warning: {} address(es) have no coordinates", unmatched);
        }
    }

    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const SAMPLE_RESPONSE: &str = "\
\"0\",\"200 MAIN ST, DALLAS, TX, 75201\",\"Match\",\"Exact\",\"200 MAIN ST, DALLAS, TX, 75201\",\"-96.7989,32.7812\",\"12345\",\"L\"
\"1\",\"999 NOWHERE RD, DALLAS, TX, 75299\",\"No_Match\"
";

    #[test]
    fn parse_response_splits_coordinates() {
        let hits = parse_response(SAMPLE_RESPONSE).unwrap();
        let hit = &hits["0"];
        assert_eq!(hit.latitude, "32.7812");
        assert_eq!(hit.longitude, "-96.7989");
        assert_eq!(hit.match_status, "Match");
        assert_eq!(hit.match_type, "Exact");
    }

    #[test]
    fn parse_response_tolerates_non_matches() {
        let hits = parse_response(SAMPLE_RESPONSE).unwrap();
        let miss = &hits["1"];
        assert_eq!(miss.match_status, "No_Match");
        assert!(miss.latitude.is_empty());
        assert!(miss.longitude.is_empty());
    }

    #[test]
    fn parse_response_skips_blank_ids() {
        let hits = parse_response("\"\",\"x\"\n").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn batch_csv_has_no_header() {
        let batch = build_batch_csv(&[BatchAddress {
            id: "0".into(),
            street: "200 MAIN ST".into(),
            city: "DALLAS".into(),
            state: "TX".into(),
            zip: "75201".into(),
        }])
        .unwrap();
        assert_eq!(batch, "0,200 MAIN ST,DALLAS,TX,75201\n");
    }

    #[test]
    fn submit_batch_round_trip() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/geocoder/locations/addressbatch");
            then.status(200).body(SAMPLE_RESPONSE);
        });

        let client = GeocodeClient::with_base_url(server.base_url());
        let body = client
            .submit_batch("0,200 MAIN ST,DALLAS,TX,75201\n", DEFAULT_BENCHMARK)
            .unwrap();
        assert_eq!(body, SAMPLE_RESPONSE);
        mock.assert();
    }

    #[test]
    fn submit_batch_bad_request_fails_fast() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/geocoder/locations/addressbatch");
            then.status(400).body("bad batch");
        });

        let client = GeocodeClient::with_base_url(server.base_url());
        let err = client.submit_batch("x\n", DEFAULT_BENCHMARK).unwrap_err();
        assert_eq!(err.code, EXIT_GEOCODE_VALIDATION);
    }

    #[test]
    fn geocode_appends_columns_end_to_end() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/geocoder/locations/addressbatch");
            then.status(200).body(SAMPLE_RESPONSE);
        });

        let dir = tempfile::tempdir().unwrap();
        let in_path = dir.path().join("in.csv");
        let out_path = dir.path().join("out.csv");
        std::fs::write(
            &in_path,
            "OUTLET_NAME,OUTLET_ADDRESS,OUTLET_CITY,OUTLET_STATE,OUTLET_ZIP_CODE\n\
             JOE'S,200 MAIN ST,DALLAS,TX,75201\n\
             GHOST MART,999 NOWHERE RD,DALLAS,TX,75299\n",
        )
        .unwrap();

        cmd_geocode(
            Some(in_path),
            None,
            "OUTLET_ADDRESS".into(),
            "OUTLET_CITY".into(),
            "OUTLET_STATE".into(),
            "OUTLET_ZIP_CODE".into(),
            DEFAULT_BENCHMARK.into(),
            Some(server.base_url()),
            Some(out_path.clone()),
            true,
        )
        .unwrap();

        let out = std::fs::read_to_string(&out_path).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "OUTLET_NAME,OUTLET_ADDRESS,OUTLET_CITY,OUTLET_STATE,OUTLET_ZIP_CODE,\
             LATITUDE,LONGITUDE,GEOCODE_MATCH,GEOCODE_MATCH_TYPE"
        );
        assert_eq!(
            lines.next().unwrap(),
            "JOE'S,200 MAIN ST,DALLAS,TX,75201,32.7812,-96.7989,Match,Exact"
        );
        assert_eq!(
            lines.next().unwrap(),
            "GHOST MART,999 NOWHERE RD,DALLAS,TX,75299,,,No_Match,"
        );
    }

    #[test]
    fn missing_address_column_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let in_path = dir.path().join("in.csv");
        std::fs::write(&in_path, "NAME\nX\n").unwrap();

        let err = cmd_geocode(
            Some(in_path),
            None,
            "OUTLET_ADDRESS".into(),
            "OUTLET_CITY".into(),
            "OUTLET_STATE".into(),
            "OUTLET_ZIP_CODE".into(),
            DEFAULT_BENCHMARK.into(),
            None,
            None,
            true,
        )
        .unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
    }
}
