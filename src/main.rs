// ShotSync Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use shotsync_core::reconcile::{self, BackupKind};
use shotsync_core::scan::{self, ScanEntry};
use shotsync_core::ReconcileConfig;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "shotsync")]
#[command(about = "Project document repair tools for the video pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove duplicate video records, keeping the newest per shot
    Dedupe {
        /// Project directory (defaults to SHOTSYNC_PROJECT_DIR)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Rebuild shot-image mappings from the voice segments
    Remap {
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Voice segments per scene
        #[arg(long)]
        shots_per_scene: Option<usize>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Show ID mismatches between voice segments and image mappings
    Analyze {
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Check that every voice segment has its image mapping
    Validate {
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Convert a shot id between text-segment, unified key and index forms
    Resolve {
        /// Any shot id: text_segment_004, scene_2_shot_1, 镜头4 or 4
        #[arg(short, long)]
        id: String,

        #[arg(short, long)]
        project: Option<PathBuf>,

        #[arg(long)]
        shots_per_scene: Option<usize>,
    },

    /// Put a pre-mutation backup back in place
    Restore {
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Which run's backup to restore
        #[arg(long, value_enum)]
        from: BackupChoice,
    },

    /// Find projects under an output root that need cleanup
    Scan {
        /// Output root (defaults to SHOTSYNC_OUTPUT_ROOT, then ./output)
        #[arg(short, long)]
        root: Option<PathBuf>,

        #[arg(long, default_value_t = 3)]
        max_depth: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackupChoice {
    Dedupe,
    Remap,
}

impl From<BackupChoice> for BackupKind {
    fn from(choice: BackupChoice) -> Self {
        match choice {
            BackupChoice::Dedupe => BackupKind::Dedupe,
            BackupChoice::Remap => BackupKind::Remap,
        }
    }
}

fn project_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(dir) => Ok(dir),
        None => std::env::var("SHOTSYNC_PROJECT_DIR")
            .map(PathBuf::from)
            .context("No project given: pass --project or set SHOTSYNC_PROJECT_DIR"),
    }
}

fn with_scene_size(mut config: ReconcileConfig, shots_per_scene: Option<usize>) -> ReconcileConfig {
    if let Some(n) = shots_per_scene {
        config.shots_per_scene = n;
    }
    config
}

fn main() -> ExitCode {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Cli::parse();

    match run(args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            println!("\n❌ Failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Dispatch one command. `Ok(false)` means the run finished but the
/// project is not in the expected state.
fn run(command: Commands) -> Result<bool> {
    let config = ReconcileConfig::from_env().context("Invalid SHOTSYNC_* configuration")?;

    match command {
        Commands::Dedupe { project, dry_run } => {
            let dir = project_dir(project)?;
            println!("🧹 Video record cleanup: {}", dir.display());
            println!("{}", "=".repeat(50));

            let outcome = reconcile::run_dedupe(&dir, &config, dry_run)
                .with_context(|| format!("Dedupe failed for {}", dir.display()))?;
            let report = &outcome.report;

            if let Some(backup) = &outcome.backup_path {
                println!("✅ Backup: {}", backup.display());
            }
            println!("📊 Records before: {}", report.original_count);
            println!("📊 Unique shots:   {}", report.unique_shots());
            if report.orphaned_count > 0 {
                println!("🗑️ Dropped {} records without a shot id", report.orphaned_count);
            }
            for group in &report.groups {
                println!(
                    "🔧 Shot {}: removing {} duplicate(s), keeping the newest",
                    group.shot_id,
                    group.dropped.len()
                );
                println!(
                    "   ✅ keep: {} ({})",
                    group.kept.video_path.as_deref().unwrap_or("N/A"),
                    group.kept.created_time
                );
                for dropped in &group.dropped {
                    println!(
                        "   ❌ drop: {} ({})",
                        dropped.video_path.as_deref().unwrap_or("N/A"),
                        dropped.created_time
                    );
                }
            }
            println!("📊 Records after:  {}", report.retained_count);
            println!("🗑️ Duplicates removed: {}", report.removed_duplicates);
            if dry_run {
                println!("\n(dry run: nothing written)");
            } else {
                println!("\n🎉 Cleanup complete");
            }
            Ok(true)
        }

        Commands::Remap {
            project,
            shots_per_scene,
            dry_run,
        } => {
            let dir = project_dir(project)?;
            let config = with_scene_size(config, shots_per_scene);
            println!("🔗 Voice/image remap: {}", dir.display());
            println!("{}", "=".repeat(50));

            let outcome = reconcile::run_remap(&dir, &config, dry_run)
                .with_context(|| format!("Remap failed for {}", dir.display()))?;
            let report = &outcome.report;

            if let Some(backup) = &outcome.backup_path {
                println!("✅ Backup: {}", backup.display());
            }
            for identity in report.index.iter() {
                println!(
                    "   {:>3}: {}_{} -> {}",
                    identity.global_index,
                    identity.key.scene_id(),
                    identity.text_segment_id,
                    identity.unified_key()
                );
            }
            println!("📊 Voice segments: {}", report.segment_count);
            println!("📊 Scenes:         {}", report.scene_count);
            println!(
                "📊 Mappings:       {} (previously {})",
                report.mapping_count, report.previous_mapping_count
            );
            if report.discarded_with_images > 0 {
                println!(
                    "⚠️ {} old mappings referenced generated images and were discarded",
                    report.discarded_with_images
                );
            }
            if dry_run {
                println!("\n(dry run: nothing written)");
            } else {
                println!("\n✅ Voice segments and image mappings match");
            }
            Ok(true)
        }

        Commands::Analyze { project } => {
            let dir = project_dir(project)?;
            let analysis = reconcile::run_analyze(&dir, &config)
                .with_context(|| format!("Analyze failed for {}", dir.display()))?;

            println!("Analysis of {}:", dir.display());
            println!("  Voice segments:      {}", analysis.voice_segment_count);
            println!("  Image mappings:      {}", analysis.mapping_count);
            println!("  Missing in images:   {}", analysis.missing_in_images.len());
            for id in &analysis.missing_in_images {
                println!("    - {}", id);
            }
            println!("  Missing in voice:    {}", analysis.missing_in_voice.len());
            for id in &analysis.missing_in_voice {
                println!("    - {}", id);
            }
            println!("  ID format issues:    {}", analysis.id_format_issues.len());
            match analysis.videos {
                Some(stats) => println!(
                    "  Videos:              {} records, {} shots, {} duplicates, {} orphans",
                    stats.records, stats.distinct_shots, stats.duplicate_records, stats.orphaned
                ),
                None => println!("  Videos:              (no video section)"),
            }
            if analysis.needs_remap() {
                println!("\n⚠️ Counts differ: run `shotsync remap`");
            } else {
                println!("\n✅ Counts match, no remap needed");
            }
            Ok(true)
        }

        Commands::Validate { project } => {
            let dir = project_dir(project)?;
            let report = reconcile::run_validate(&dir, &config)
                .with_context(|| format!("Validate failed for {}", dir.display()))?;

            println!("Voice segments: {}", report.voice_segment_count);
            println!("Image mappings: {}", report.mapping_count);
            println!("ID format ok:   {}", report.id_format_correct);
            for key in &report.missing_mappings {
                println!("  missing mapping: {}", key);
            }
            if report.is_valid() {
                println!("\n✅ Validation passed");
            } else {
                println!("\n❌ Validation failed");
            }
            Ok(report.is_valid())
        }

        Commands::Resolve {
            id,
            project,
            shots_per_scene,
        } => {
            let dir = project_dir(project)?;
            let config = with_scene_size(config, shots_per_scene);
            match reconcile::run_resolve(&dir, &config, &id)? {
                Some(identity) => {
                    println!("Global index:    {}", identity.global_index);
                    println!("Scene:           {}", identity.key.scene_id());
                    println!("Shot:            {}", identity.key.shot_id());
                    println!("Text segment id: {}", identity.text_segment_id);
                    println!("Unified key:     {}", identity.unified_key());
                    Ok(true)
                }
                None => {
                    println!("❌ No shot matches '{}'", id);
                    Ok(false)
                }
            }
        }

        Commands::Restore { project, from } => {
            let dir = project_dir(project)?;
            let backup = reconcile::run_restore(&dir, &config, from.into())?;
            println!("♻️ Restored from {}", backup.display());
            Ok(true)
        }

        Commands::Scan { root, max_depth } => {
            let root = root
                .or_else(|| std::env::var("SHOTSYNC_OUTPUT_ROOT").ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("output"));
            let entries = scan::scan_projects(&root, &config.project_file, max_depth)?;

            let mut attention = 0;
            for entry in &entries {
                match entry {
                    ScanEntry::Project(summary) => {
                        let flag = if summary.needs_attention() { "⚠️" } else { "✅" };
                        if summary.needs_attention() {
                            attention += 1;
                        }
                        let videos = summary
                            .videos
                            .map(|v| format!("{} videos/{} shots", v.records, v.distinct_shots))
                            .unwrap_or_else(|| "no videos".to_string());
                        let voice = summary
                            .voice_segments
                            .map(|n| format!("{} voice/{} mappings", n, summary.mappings))
                            .unwrap_or_else(|| "no voice".to_string());
                        println!("{} {} | {} | {}", flag, summary.path.display(), videos, voice);
                    }
                    ScanEntry::Unreadable { path, reason } => {
                        attention += 1;
                        println!("❌ {} | {}", path.display(), reason);
                    }
                }
            }
            println!("\n{} projects, {} need attention", entries.len(), attention);
            Ok(true)
        }
    }
}
