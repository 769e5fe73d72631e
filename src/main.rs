/// Запуск пайплайна подготовки данных из командной строки

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use buildage_prep::{
    pipeline::{DatasetFile, Pipeline},
    BuildingTable, JsonFigureWriter, PipelineConfig,
};

#[derive(Debug, Parser)]
#[command(name = "buildage-prep", about = "Prepare building age datasets and diagnostic figures")]
struct Args {
    /// JSON с полями `features` и `records`
    #[arg(long)]
    dataset: PathBuf,

    /// JSON с конфигурацией пайплайна; по умолчанию встроенная
    #[arg(long)]
    config: Option<PathBuf>,

    /// Каталог для train.json, test.json и figures/
    #[arg(long)]
    out: PathBuf,
}

fn write_table(path: &Path, table: &BuildingTable) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let reader = BufReader::new(
        File::open(&args.dataset).with_context(|| format!("opening dataset {}", args.dataset.display()))?,
    );
    let dataset: DatasetFile = serde_json::from_reader(reader).context("parsing dataset")?;
    let table = dataset.into_table()?;
    tracing::info!("Loaded {} buildings from {}", table.len(), args.dataset.display());

    std::fs::create_dir_all(&args.out)?;
    let mut figures = JsonFigureWriter::new(args.out.join("figures"))?;

    let pipeline = Pipeline::new(config)?;
    let pair = pipeline.run(&table, &mut figures)?;

    write_table(&args.out.join("train.json"), &pair.train)?;
    write_table(&args.out.join("test.json"), &pair.test)?;
    tracing::info!(
        "Wrote {} train rows, {} test rows and {} figures to {}",
        pair.train.len(),
        pair.test.len(),
        figures.written(),
        args.out.display()
    );

    Ok(())
}
