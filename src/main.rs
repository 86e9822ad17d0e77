//! Gazeblur CLI - Attention-guided Image Degradation
//!
//! A thin command line front end over the gazeblur library.

use anyhow::{anyhow, bail, Context, Result};
use gazeblur::prelude::*;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("gazeblur");

    if args.len() < 2 {
        print_usage(program);
        return;
    }

    let result = match args[1].as_str() {
        "list" => list_filters(args.iter().any(|a| a == "--json")),
        "info" => match args.get(2) {
            Some(id) => filter_info(id),
            None => Err(anyhow!("Please specify a filter ID")),
        },
        "process" => {
            if args.len() < 5 {
                eprintln!("Usage: {} process <image> <heatmap> <output> [options]", program);
                std::process::exit(2);
            }
            process_image(&args[2..])
        }
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(program);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("🎯 Gazeblur v{}", gazeblur::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list [--json]                       List all available filters");
    println!("  info <filter>                       Show detailed info about a filter");
    println!("  process <image> <heatmap> <output>  Apply a filter stack");
    println!("  help                                Show this help message");
    println!();
    println!("Process options:");
    println!("  --filter <id>[:k=v,...]  Append a filter to the stack (repeatable, in order)");
    println!("  --config <file.toml>     Load remap and pipeline settings");
    println!("  --gain <g>               Linear remap gain");
    println!("  --offset <o>             Linear remap offset");
    println!("  --threshold <t>          Zero weights below t");
    println!("  --gamma <g>              Gamma remap");
    println!("  --invert                 Invert the remapped heatmap");
    println!("  --heatmap-out <path>     Also save the remapped heatmap");
    println!("  --sequential             Disable row parallelism");
}

fn list_filters(json: bool) -> Result<()> {
    let registry = FilterRegistry::with_builtins();

    if json {
        let all: Vec<&FilterMetadata> = registry.filters().map(|(_, e)| &e.metadata).collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("Available filters ({} total):", registry.len());
    println!();
    for (category, filters) in registry.grouped_by_category() {
        println!("  📁 {}", category.display_name());
        for metadata in filters {
            println!("      • {} - {}", metadata.id, metadata.description);
        }
        println!();
    }
    Ok(())
}

fn filter_info(filter_id: &str) -> Result<()> {
    let registry = FilterRegistry::with_builtins();
    let metadata = registry
        .get_metadata(filter_id)
        .ok_or_else(|| anyhow!("Filter not found: {} (use 'list' to see available filters)", filter_id))?;

    println!("Filter: {}", metadata.name);
    println!("ID: {}", metadata.id);
    println!("Category: {}", metadata.category.display_name());
    println!("Version: {}", metadata.version);
    println!();
    println!("Description:");
    println!("  {}", metadata.description);

    if !metadata.attributes.is_empty() {
        println!();
        println!("Attributes:");
        for attr in &metadata.attributes {
            println!("  • {} [{}] = {}", attr.name, attr.attr_type, attr.default_value);
            if !attr.description.is_empty() {
                println!("    {}", attr.description);
            }
            for constraint in &attr.constraints {
                println!("    {}", constraint.description());
            }
        }
    }
    Ok(())
}

/// Remap-related flags; at most one curve may be chosen.
#[derive(Default)]
struct RemapFlags {
    gain: Option<f32>,
    offset: Option<f32>,
    threshold: Option<f32>,
    gamma: Option<f32>,
    invert: bool,
}

impl RemapFlags {
    fn apply(&self, mut config: RemapConfig) -> Result<RemapConfig> {
        let linear = self.gain.is_some() || self.offset.is_some();
        let chosen = [linear, self.threshold.is_some(), self.gamma.is_some()]
            .iter()
            .filter(|&&c| c)
            .count();
        if chosen > 1 {
            bail!("Choose only one of --gain/--offset, --threshold and --gamma");
        }

        if linear {
            config.curve = RemapCurve::Linear {
                gain: self.gain.unwrap_or(1.0),
                offset: self.offset.unwrap_or(0.0),
            };
        } else if let Some(threshold) = self.threshold {
            config.curve = RemapCurve::Threshold { threshold };
        } else if let Some(gamma) = self.gamma {
            config.curve = RemapCurve::Gamma { gamma };
        }
        config.invert |= self.invert;
        Ok(config)
    }
}

fn process_image(args: &[String]) -> Result<()> {
    let image_path = PathBuf::from(&args[0]);
    let heatmap_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);

    let mut filter_args: Vec<&str> = Vec::new();
    let mut config_path: Option<PathBuf> = None;
    let mut heatmap_out: Option<PathBuf> = None;
    let mut sequential = false;
    let mut remap = RemapFlags::default();

    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        let mut value = |flag: &str| {
            rest.next()
                .map(String::as_str)
                .ok_or_else(|| anyhow!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--filter" => filter_args.push(value("--filter")?),
            "--config" => config_path = Some(PathBuf::from(value("--config")?)),
            "--gain" => remap.gain = Some(parse_number("--gain", value("--gain")?)?),
            "--offset" => remap.offset = Some(parse_number("--offset", value("--offset")?)?),
            "--threshold" => remap.threshold = Some(parse_number("--threshold", value("--threshold")?)?),
            "--gamma" => remap.gamma = Some(parse_number("--gamma", value("--gamma")?)?),
            "--heatmap-out" => heatmap_out = Some(PathBuf::from(value("--heatmap-out")?)),
            "--invert" => remap.invert = true,
            "--sequential" => sequential = true,
            other => bail!("Unknown option: {}", other),
        }
    }

    let config = match &config_path {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    let mut session = Session::new();
    session.apply_config(&config)?;
    session.set_remap_config(remap.apply(config.remap)?)?;

    let options = PipelineOptions::new()
        .with_parallel(config.pipeline.parallel && !sequential)
        .with_progress(|update| match update {
            ProgressUpdate::FilterStarted { filter_name, index, total, .. } => {
                println!("   • [{}/{}] {}", index + 1, total, filter_name);
            }
            ProgressUpdate::Completed { total_duration_ms, filters_run } => {
                println!("✅ Complete in {}ms ({} filters)", total_duration_ms, filters_run);
            }
            _ => {}
        });
    session.set_pipeline_options(options);

    for arg in &filter_args {
        let instance = build_instance(session.registry(), arg)?;
        let stack = session.stack_mut();
        let id = stack.add_instance(instance);
        if let Some((_, index)) = stack.position(id) {
            stack.select_available(index)?;
            stack.add()?;
        }
    }

    session
        .load_source_image(&image_path)
        .with_context(|| format!("loading image {}", image_path.display()))?;
    session
        .load_heatmap(&heatmap_path)
        .with_context(|| format!("loading heatmap {}", heatmap_path.display()))?;

    println!("⚙️  Processing {} -> {}", image_path.display(), output_path.display());
    if let Err(e) = session.render() {
        if let Some(fix) = e.suggested_fix() {
            eprintln!("   hint: {}", fix);
        }
        return Err(e.into());
    }

    session.save_output(&output_path)?;
    if let Some(path) = heatmap_out {
        session.save_remapped_heatmap(&path)?;
        println!("🗺️  Heatmap saved to: {}", path.display());
    }
    println!("🎉 Image saved to: {}", output_path.display());
    Ok(())
}

/// Parse `id[:name=value,...]` into a configured instance.
fn build_instance(registry: &FilterRegistry, arg: &str) -> Result<FilterInstance> {
    let (id, assignments) = match arg.split_once(':') {
        Some((id, rest)) => (id, rest),
        None => (arg, ""),
    };

    let mut instance = registry
        .instantiate(id)
        .ok_or_else(|| anyhow!("Filter not found: {}", id))?;

    for assignment in assignments.split(',').filter(|a| !a.is_empty()) {
        let (name, text) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected name=value, got '{}'", assignment))?;
        let definition = instance
            .metadata()
            .get_attribute(name)
            .ok_or_else(|| anyhow!("Filter '{}' has no attribute '{}'", id, name))?;
        let value = Value::parse_as(text, definition.attr_type)
            .ok_or_else(|| anyhow!("'{}' is not a valid {} for '{}'", text, definition.attr_type, name))?;
        instance.set_attribute(name, value)?;
    }

    Ok(instance)
}

fn parse_number(flag: &str, text: &str) -> Result<f32> {
    text.parse()
        .with_context(|| format!("{} expects a number, got '{}'", flag, text))
}
