use std::path::Path;

use anyhow::{bail, Context};

use epidemic_core::{population::DemographicRecord, world::commons::AgeGroup};

const AGE_BIN_YEARS: usize = 5;
const LAST_BIN: usize = 17;

/// Reads a census-style demographic CSV. Each row is
/// `Gender,<M|F><range>,<count>` where the range is a five-year bin such
/// as `0-4` or the open-ended `85+`. Gendered rows for the same bin are
/// merged; any row past the `Gender` block ends the file.
pub fn load(path: &Path) -> anyhow::Result<Vec<DemographicRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("cannot open demographics file {}", path.display()))?;

    let mut counts = [0u32; LAST_BIN + 1];
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("row {}: unreadable record", row + 1))?;
        if record.get(0) != Some("Gender") {
            break;
        }
        let profile = record
            .get(1)
            .with_context(|| format!("row {}: missing profile column", row + 1))?;
        let count: u32 = record
            .get(2)
            .with_context(|| format!("row {}: missing count column", row + 1))?
            .trim()
            .parse()
            .with_context(|| format!("row {}: count is not a number", row + 1))?;
        let bin = parse_age_bin(profile)
            .with_context(|| format!("row {}: bad profile {profile:?}", row + 1))?;
        counts[bin.index()] += count;
    }

    let records: Vec<DemographicRecord> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .filter_map(|(bin, &count)| {
            AgeGroup::new(bin).map(|age_group| DemographicRecord { age_group, count })
        })
        .collect();
    if records.is_empty() {
        bail!("demographics file {} holds no agents", path.display());
    }
    Ok(records)
}

/// `M25-29` → bin 5, `F85+` → bin 17. The gender prefix is optional.
fn parse_age_bin(profile: &str) -> anyhow::Result<AgeGroup> {
    let range = profile.trim_start_matches(['M', 'F']);
    let bin = if range == "85+" {
        LAST_BIN
    } else {
        let lower: usize = range
            .split('-')
            .next()
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("age range {range:?} has no numeric lower bound"))?;
        lower / AGE_BIN_YEARS
    };
    AgeGroup::new(bin).with_context(|| format!("age range {range:?} is out of bins"))
}
