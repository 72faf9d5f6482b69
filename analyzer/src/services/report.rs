//! Public-API extraction from the fuzzer-generation report

use crate::models::error::LoadError;
use crate::models::report::{
    FuzzGenReport, PublicApiMap, BUILD_STATUS_SUCCESS, FUZZER_LABEL_SUFFIX, STATUS_GENERATED,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

pub fn load_public_api(report_path: &Path) -> Result<PublicApiMap, LoadError> {
    let file = File::open(report_path).map_err(|source| LoadError::FileRead {
        path: report_path.to_path_buf(),
        source,
    })?;
    let report: FuzzGenReport =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::JsonDecode {
            path: report_path.to_path_buf(),
            source,
        })?;

    let public_api = public_api_from_report(&report);
    debug!(apis = public_api.len(), "public API map loaded");
    Ok(public_api)
}

/// Keeps an entry iff its fuzzer was generated and built successfully and it
/// names an API. Entries sharing a name accumulate their fuzzer labels.
pub fn public_api_from_report(report: &FuzzGenReport) -> PublicApiMap {
    let mut public_api = PublicApiMap::new();
    for api in &report.api {
        if api.status != STATUS_GENERATED
            || api.fuzzer_build_status != BUILD_STATUS_SUCCESS
            || api.name.is_empty()
        {
            continue;
        }
        let fuzzers = api
            .status_list
            .iter()
            .filter(|item| item.status == STATUS_GENERATED && !item.status_from_ut.is_empty())
            .map(|item| format!("{}{}", item.status_from_ut, FUZZER_LABEL_SUFFIX));
        public_api.entry(api.name.clone()).or_default().extend(fuzzers);
    }
    public_api
}
