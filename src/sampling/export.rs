//! CSV export of sample partitions

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use ndarray::{Array1, Array2};

use super::errors::SamplingResult;
use super::split::TrainTestSplit;

/// Writes one row per sample: band values followed by the label
pub fn write_samples<W: Write>(
    writer: W,
    features: &Array2<f64>,
    labels: &Array1<i16>,
    band_names: &[String],
    label_field: &str,
) -> SamplingResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = (0..features.ncols())
        .map(|i| band_names.get(i).cloned().unwrap_or_else(|| format!("b{}", i + 1)))
        .collect();
    header.push(label_field.to_string());
    csv_writer.write_record(&header)?;

    for (row, label) in features.rows().into_iter().zip(labels.iter()) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(label.to_string());
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes `train.csv` and `test.csv` into `dir`, creating it if needed
pub fn export_split(
    dir: &Path,
    split: &TrainTestSplit,
    band_names: &[String],
    label_field: &str,
) -> SamplingResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let train_path = dir.join("train.csv");
    let test_path = dir.join("test.csv");

    write_samples(fs::File::create(&train_path)?, &split.train_features, &split.train_labels, band_names, label_field)?;
    write_samples(fs::File::create(&test_path)?, &split.test_features, &split.test_labels, band_names, label_field)?;

    info!("Wrote {} and {}", train_path.display(), test_path.display());
    Ok((train_path, test_path))
}
