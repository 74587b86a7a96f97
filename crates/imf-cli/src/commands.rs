use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use imf_assetmap::{dirname, parse_asset_map_bytes, ParseContext};
use imf_io::{DocumentLoader, FileOpener, Interrupt};
use imf_package::{CompositionIdReader, CompositionSummary, ImfConfig, ImfPackage};
use imf_types::{AssetId, AssetLocator};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Assets(args) => {
            let report = assets_report(with_override(config, args.assetmap), &args.cpl)?;
            render(cli.format, &report, print_assets)
        }
        Command::Locate(args) => {
            let report = locate_report(with_override(config, args.assetmap), &args.cpl, &args.id)?;
            render(cli.format, &report, print_locate)
        }
        Command::Check(args) => {
            let report = check_report(&config, &args.assetmap, args.base.as_deref())?;
            render(cli.format, &report, print_check)
        }
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<ImfConfig> {
    match path {
        Some(path) => {
            debug!(path, "loading config");
            ImfConfig::load(Path::new(path)).with_context(|| format!("loading config {path}"))
        }
        None => Ok(ImfConfig::default()),
    }
}

/// A command-line `--assetmap` beats the config file.
fn with_override(mut config: ImfConfig, assetmap: Option<String>) -> ImfConfig {
    if assetmap.is_some() {
        config.asset_map = assetmap;
    }
    config
}

fn render<T: Serialize>(format: OutputFormat, report: &T, text: fn(&T)) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => text(report),
    }
    Ok(())
}

fn open_package(config: ImfConfig, cpl: &str) -> anyhow::Result<ImfPackage<CompositionIdReader, FileOpener>> {
    let mut package = ImfPackage::new(config, FileOpener, CompositionIdReader);
    package
        .open(cpl, None)
        .with_context(|| format!("opening IMF package {cpl}"))?;
    Ok(package)
}

#[derive(Debug, Serialize)]
pub struct AssetsReport {
    pub composition: CompositionSummary,
    pub asset_map: String,
    pub assets: Vec<AssetLocator>,
    pub missing: Vec<AssetId>,
}

pub fn assets_report(config: ImfConfig, cpl: &str) -> anyhow::Result<AssetsReport> {
    let package = open_package(config, cpl)?;
    let missing = package.missing_assets()?;
    let asset_map = package.asset_map_url().unwrap_or_default().to_string();
    let (composition, registry) = package.into_parts()?;
    Ok(AssetsReport {
        composition,
        asset_map,
        assets: registry.into_iter().collect(),
        missing,
    })
}

fn print_assets(report: &AssetsReport) {
    let title = report.composition.content_title.as_deref().unwrap_or("(untitled)");
    println!("{} {}", "CPL".bold(), report.composition.id.to_string().cyan());
    println!("  Title: {}", title);
    println!("  Asset map: {}", report.asset_map);
    println!("  Assets: {}", report.assets.len().to_string().bold());
    for asset in &report.assets {
        println!("  {}  {}", asset.id().to_string().yellow(), asset.absolute_uri());
    }
    if report.missing.is_empty() {
        println!("{} Every referenced track file is listed", "✓".green().bold());
    } else {
        for id in &report.missing {
            println!("{} {} is referenced but not listed", "✗".red().bold(), id.to_string().yellow());
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub id: AssetId,
    pub uri: String,
}

pub fn locate_report(config: ImfConfig, cpl: &str, id: &str) -> anyhow::Result<LocateReport> {
    let id = AssetId::parse(id).with_context(|| format!("invalid asset id {id:?}"))?;
    let mut package = open_package(config, cpl)?;
    let uri = package
        .registry()
        .context("package has no registry")?
        .locate(&id)?
        .absolute_uri()
        .to_string();
    package.close();
    Ok(LocateReport { id, uri })
}

fn print_locate(report: &LocateReport) {
    println!("{}", report.uri);
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub asset_map: String,
    pub base: String,
    pub count: usize,
    pub duplicates: Vec<AssetId>,
    pub assets: Vec<AssetLocator>,
}

pub fn check_report(config: &ImfConfig, asset_map: &str, base: Option<&str>) -> anyhow::Result<CheckReport> {
    let interrupt = Interrupt::never();
    let loader = DocumentLoader::new(&FileOpener, &config.stream_options, &interrupt)
        .with_config(config.loader_config());
    let bytes = loader.load(asset_map, None)?;

    let base = base.map_or_else(|| dirname(asset_map), str::to_owned);
    let ctx = ParseContext::new(asset_map, &base);
    let registry = parse_asset_map_bytes(&bytes, &ctx)?;

    Ok(CheckReport {
        asset_map: asset_map.to_string(),
        count: registry.len(),
        duplicates: registry.duplicates(),
        assets: registry.into_iter().collect(),
        base,
    })
}

fn print_check(report: &CheckReport) {
    println!(
        "{} {} lists {} assets",
        "✓".green().bold(),
        report.asset_map.bold(),
        report.count.to_string().bold()
    );
    println!("  Base: {}", report.base);
    for asset in &report.assets {
        println!("  {}  {}", asset.id().to_string().yellow(), asset.absolute_uri());
    }
    for id in &report.duplicates {
        println!("  {} {} appears more than once; first entry wins", "!".yellow().bold(), id);
    }
}
