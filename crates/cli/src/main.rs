mod prompt;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use prompt::StdinPrompter;
use pthree_core::{
    app_paths, apply_plan, available_presets, bundled_preset_names, compile_preset,
    detect_preset, install_bundled_presets, load_config, plan_field_edit, plan_full_rename, plan_transfer, prepare_output_dir, save_config,
    write_exif_sidecars, write_file_list, write_texif_full, write_texif_simple, AppConfig,
    BatchContext, BatchError, CanonicalName, CompiledPreset, EditMode, ExifTool, FileFilter,
    FileNameChunk, FilterMode, Filtered, Preset, Prompter, RenamePlan, ReportLevel,
    TransferMode, AUTO_PRESET,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pthree")]
#[command(about = "写真のファイル名を整形し、メタデータファイルを生成します")]
struct Cli {
    /// debugログを表示します
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// リネーム、TEXIF、MIEをまとめて実行します
    Process(ProcessArgs),
    /// 写真を整形済みファイル名にリネームします
    Rename(RenameArgs),
    /// テキストEXIF (TEXIF) を生成します
    Texif(TexifArgs),
    /// MIEサイドカーを生成します
    Exif(ExifArgs),
    /// 整形済みファイル名を分解して表示します
    Info(InfoArgs),
    /// ファイル名を一覧表示します
    List(ListArgs),
    /// 絞り込んだファイルをコピーまたは移動します
    Yank(YankArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// 既定の設定ファイルとプリセットフォルダを作成します
    Init,
}

#[derive(Debug, Args)]
struct ExtensionArg {
    /// 処理するファイルの拡張子
    #[arg(short = 'x', long = "extension", visible_alias = "ext")]
    extension: Option<String>,
}

impl ExtensionArg {
    fn resolve(&self, config: &AppConfig) -> String {
        self.extension
            .clone()
            .unwrap_or_else(|| config.default_extension.clone())
    }
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// ファイル名の形式で絞り込みます
    #[arg(long, value_enum)]
    filter: Option<FilterArg>,
    /// 絞り込みに使うチャンク (値は対話入力)
    #[arg(long, value_enum, value_delimiter = ',')]
    check: Vec<ChunkArg>,
}

#[derive(Debug, Args)]
struct PresetArgs {
    /// TEXIFのプリセット名 (auto で自動選択)
    #[arg(short, long, default_value = AUTO_PRESET)]
    preset: String,
    /// プリセットフォルダ
    #[arg(long)]
    preset_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ProcessArgs {
    initials: String,
    #[arg(default_value = ".")]
    directory: PathBuf,
    #[arg(default_value = "output")]
    output: PathBuf,
    /// 元ファイルを残してコピーします
    #[arg(short, long, visible_alias = "keep-original", default_value_t = false)]
    keep: bool,
    #[command(flatten)]
    preset: PresetArgs,
    #[command(flatten)]
    extension: ExtensionArg,
}

#[derive(Debug, Args)]
struct RenameArgs {
    initials: String,
    #[arg(default_value = ".")]
    directory: PathBuf,
    #[arg(default_value = "output")]
    output: PathBuf,
    #[arg(short, long, visible_alias = "keep-original", default_value_t = false)]
    keep: bool,
    /// 全体リネームの代わりに指定チャンクだけを編集します
    #[arg(short, long, value_enum, value_delimiter = ',')]
    edit: Vec<ChunkArg>,
    /// ファイルごとに値を入力します
    #[arg(long, default_value_t = false)]
    per_file: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    #[command(flatten)]
    extension: ExtensionArg,
}

#[derive(Debug, Args)]
struct TexifArgs {
    #[arg(default_value = ".")]
    directory: PathBuf,
    #[arg(default_value = "output")]
    output: PathBuf,
    #[arg(short, long = "type", value_enum, default_value_t = TexifType::Both)]
    texif_type: TexifType,
    #[arg(short, long, value_enum, default_value_t = LevelArg::High)]
    level: LevelArg,
    #[command(flatten)]
    preset: PresetArgs,
    #[command(flatten)]
    filter: FilterArgs,
    #[command(flatten)]
    extension: ExtensionArg,
}

#[derive(Debug, Args)]
struct ExifArgs {
    #[arg(default_value = ".")]
    directory: PathBuf,
    #[arg(default_value = "output")]
    output: PathBuf,
    #[command(flatten)]
    filter: FilterArgs,
    #[command(flatten)]
    extension: ExtensionArg,
}

#[derive(Debug, Args)]
struct InfoArgs {
    #[arg(default_value = ".")]
    directory: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    #[command(flatten)]
    filter: FilterArgs,
    #[command(flatten)]
    extension: ExtensionArg,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(default_value = ".")]
    directory: PathBuf,
    /// 一覧を <output>/output.txt に書き出します
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    full_path: bool,
    #[command(flatten)]
    filter: FilterArgs,
    #[command(flatten)]
    extension: ExtensionArg,
}

#[derive(Debug, Args)]
struct YankArgs {
    #[arg(default_value = ".")]
    directory: PathBuf,
    #[arg(default_value = "output")]
    output: PathBuf,
    #[arg(short, long, visible_alias = "keep-original", default_value_t = false)]
    keep: bool,
    #[command(flatten)]
    filter: FilterArgs,
    #[command(flatten)]
    extension: ExtensionArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    None,
    Formatted,
    Unformatted,
}

impl From<FilterArg> for FilterMode {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::None => FilterMode::None,
            FilterArg::Formatted => FilterMode::Formatted,
            FilterArg::Unformatted => FilterMode::Unformatted,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChunkArg {
    Initials,
    Datetime,
    Sequence,
    Style,
    Rating,
    Original,
}

impl From<ChunkArg> for FileNameChunk {
    fn from(value: ChunkArg) -> Self {
        match value {
            ChunkArg::Initials => FileNameChunk::Initials,
            ChunkArg::Datetime => FileNameChunk::DateTime,
            ChunkArg::Sequence => FileNameChunk::Sequence,
            ChunkArg::Style => FileNameChunk::Style,
            ChunkArg::Rating => FileNameChunk::Rating,
            ChunkArg::Original => FileNameChunk::Original,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TexifType {
    Simple,
    Full,
    Both,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Low,
    Medium,
    High,
}

impl From<LevelArg> for ReportLevel {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::Low => ReportLevel::Low,
            LevelArg::Medium => ReportLevel::Medium,
            LevelArg::High => ReportLevel::High,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("エラー: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    let config = load_config()?;
    let mut prompter = StdinPrompter;

    match command {
        Commands::Process(args) => cmd_process(args, &config, &mut prompter),
        Commands::Rename(args) => cmd_rename(args, &config, &mut prompter),
        Commands::Texif(args) => cmd_texif(args, &config, &mut prompter),
        Commands::Exif(args) => cmd_exif(args, &config, &mut prompter),
        Commands::Info(args) => cmd_info(args, &config, &mut prompter),
        Commands::List(args) => cmd_list(args, &config, &mut prompter),
        Commands::Yank(args) => cmd_yank(args, &config, &mut prompter),
        Commands::Config(config_args) => match config_args.action {
            ConfigAction::Show => cmd_config_show(&config),
            ConfigAction::Init => cmd_config_init(),
        },
    }
}

fn cmd_process(args: ProcessArgs, config: &AppConfig, prompter: &mut StdinPrompter) -> Result<()> {
    confirm_initials(&args.initials, prompter)?;
    let extension = args.extension.resolve(config);
    let mut exiftool = ExifTool::spawn(&config.exiftool_path)?;
    let ctx = BatchContext::load(&mut exiftool, &args.directory, &extension)?;

    let images = args.output.join(extension.to_lowercase());
    let plan = plan_full_rename(&mut exiftool, &ctx, &args.initials, &images)?;
    plan.ensure_not_empty()?;

    let sources = FileFilter::new().unformatted(ctx.file_names()).accepted;
    let compiled = resolve_preset(
        &mut exiftool,
        &ctx,
        &sources,
        &args.preset,
        config,
        prompter,
    )?;

    let meta = images.join("meta");
    let simple = meta.join("simple");
    let full = meta.join("full");
    let mie = meta.join("mie");
    prepare_output_dir(&args.output, &[args.directory.as_path()], prompter)?;
    for dir in [&images, &simple, &full, &mie] {
        prepare_output_dir(dir, &[args.directory.as_path()], prompter)?;
    }

    run_plan(&plan, args.keep)?;
    let mut skipped = plan.stats.skipped;

    let renamed = BatchContext::with_names(&images, &extension, plan.new_names());
    skipped += write_texif_simple(
        &mut exiftool,
        &renamed,
        renamed.file_names(),
        &compiled,
        ReportLevel::High,
        &simple,
    )?;
    skipped += write_texif_full(&mut exiftool, &renamed, renamed.file_names(), &full)?;
    skipped += write_exif_sidecars(&mut exiftool, &renamed, renamed.file_names(), &mie)?;

    print_skipped(skipped);
    Ok(())
}

fn cmd_rename(args: RenameArgs, config: &AppConfig, prompter: &mut StdinPrompter) -> Result<()> {
    let extension = args.extension.resolve(config);
    let mut exiftool = ExifTool::spawn(&config.exiftool_path)?;
    let ctx = BatchContext::load(&mut exiftool, &args.directory, &extension)?;

    let plan = if args.edit.is_empty() {
        confirm_initials(&args.initials, prompter)?;
        plan_full_rename(&mut exiftool, &ctx, &args.initials, &args.output)?
    } else {
        let chunks: Vec<FileNameChunk> = args.edit.iter().copied().map(Into::into).collect();
        let mode = if args.per_file {
            EditMode::PerFile
        } else {
            EditMode::Bulk
        };
        let mut defaults = config.defaults.clone();
        defaults.initials = args.initials.clone();

        plan_field_edit(
            &ctx,
            &FileFilter::new(),
            &chunks,
            mode,
            prompter,
            &defaults,
            &args.output,
        )?
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Table => print_table(&plan),
    }
    plan.ensure_not_empty()?;
    prepare_output_dir(&args.output, &[args.directory.as_path()], prompter)?;
    run_plan(&plan, args.keep)?;
    print_skipped(plan.stats.skipped);
    Ok(())
}

fn cmd_texif(args: TexifArgs, config: &AppConfig, prompter: &mut StdinPrompter) -> Result<()> {
    let extension = args.extension.resolve(config);
    let mut exiftool = ExifTool::spawn(&config.exiftool_path)?;
    let ctx = BatchContext::load(&mut exiftool, &args.directory, &extension)?;
    let filtered = filter_names(&ctx, &args.filter, FilterMode::None, config, prompter)?;

    let compiled = match args.texif_type {
        TexifType::Simple | TexifType::Both => Some(resolve_preset(
            &mut exiftool,
            &ctx,
            &filtered.accepted,
            &args.preset,
            config,
            prompter,
        )?),
        TexifType::Full => None,
    };

    prepare_output_dir(&args.output, &[args.directory.as_path()], prompter)?;

    let mut skipped = filtered.skipped;
    if let Some(compiled) = &compiled {
        skipped += write_texif_simple(
            &mut exiftool,
            &ctx,
            &filtered.accepted,
            compiled,
            args.level.into(),
            &args.output,
        )?;
    }
    if args.texif_type != TexifType::Simple {
        skipped += write_texif_full(&mut exiftool, &ctx, &filtered.accepted, &args.output)?;
    }

    print_skipped(skipped);
    Ok(())
}

fn cmd_exif(args: ExifArgs, config: &AppConfig, prompter: &mut StdinPrompter) -> Result<()> {
    let extension = args.extension.resolve(config);
    let mut exiftool = ExifTool::spawn(&config.exiftool_path)?;
    let ctx = BatchContext::load(&mut exiftool, &args.directory, &extension)?;
    let filtered = filter_names(&ctx, &args.filter, FilterMode::None, config, prompter)?;

    prepare_output_dir(&args.output, &[args.directory.as_path()], prompter)?;
    let skipped = filtered.skipped
        + write_exif_sidecars(&mut exiftool, &ctx, &filtered.accepted, &args.output)?;

    print_skipped(skipped);
    Ok(())
}

fn cmd_info(args: InfoArgs, config: &AppConfig, prompter: &mut StdinPrompter) -> Result<()> {
    let extension = args.extension.resolve(config);
    let mut exiftool = ExifTool::spawn(&config.exiftool_path)?;
    let ctx = BatchContext::load(&mut exiftool, &args.directory, &extension)?;
    let filtered = filter_names(&ctx, &args.filter, FilterMode::Formatted, config, prompter)?;

    let mut skipped = filtered.skipped;
    for raw in &filtered.accepted {
        let name = match CanonicalName::decode(raw) {
            Ok(name) => name,
            Err(err) => {
                warn!("[{raw}] は解析できないためスキップします: {err}");
                skipped += 1;
                continue;
            }
        };

        let described = name.describe();
        if let OutputFormat::Json = args.format {
            println!("{}", serde_json::to_string(&described)?);
            continue;
        }
        println!("{raw}:");
        println!("    元ファイル名: {}", described.original);
        println!("    拡張子: {}", described.extension);
        println!("    撮影日時: {}", described.date_time);
        println!("    連番: {}", described.sequence);
        println!("    スタイル: {}", described.style);
        println!("    評価: {}", described.rating);
        println!("    イニシャル: {}", described.initials);
        println!();
    }

    print_skipped(skipped);
    Ok(())
}

fn cmd_list(args: ListArgs, config: &AppConfig, prompter: &mut StdinPrompter) -> Result<()> {
    let extension = args.extension.resolve(config);
    let mut exiftool = ExifTool::spawn(&config.exiftool_path)?;
    let ctx = BatchContext::load(&mut exiftool, &args.directory, &extension)?;
    let filtered = filter_names(&ctx, &args.filter, FilterMode::None, config, prompter)?;

    let lines: Vec<String> = filtered
        .accepted
        .iter()
        .map(|raw| {
            if args.full_path {
                ctx.path_of(raw).display().to_string()
            } else {
                raw.clone()
            }
        })
        .collect();

    match &args.output {
        Some(output) => {
            prepare_output_dir(output, &[args.directory.as_path()], prompter)?;
            let path = write_file_list(output, &lines)?;
            info!("一覧を書き出しました: {}", path.display());
        }
        None => {
            for line in &lines {
                println!("{line}");
            }
        }
    }

    print_skipped(filtered.skipped);
    Ok(())
}

fn cmd_yank(args: YankArgs, config: &AppConfig, prompter: &mut StdinPrompter) -> Result<()> {
    let extension = args.extension.resolve(config);
    let mut exiftool = ExifTool::spawn(&config.exiftool_path)?;
    let ctx = BatchContext::load(&mut exiftool, &args.directory, &extension)?;
    let filtered = filter_names(&ctx, &args.filter, FilterMode::None, config, prompter)?;

    let plan = plan_transfer(&ctx, &filtered.accepted, &args.output);
    prepare_output_dir(&args.output, &[args.directory.as_path()], prompter)?;
    run_plan(&plan, args.keep)?;

    print_skipped(plan.stats.skipped);
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    let preset_dir = config.resolve_preset_dir(&paths);
    println!("設定ファイル: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(config)?);
    println!("プリセットフォルダ: {}", preset_dir.display());
    if preset_dir.is_dir() {
        for name in available_presets(&preset_dir)? {
            println!("  {name}");
        }
    }
    println!("組み込みプリセット: {}", bundled_preset_names().join(", "));
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() {
        bail!(
            "設定ファイルは既に存在します: {}",
            paths.config_path.display()
        );
    }
    save_config(&AppConfig::default())?;
    let installed = install_bundled_presets(&paths.preset_dir)?;
    println!("設定ファイルを作成しました: {}", paths.config_path.display());
    println!("プリセットフォルダ: {}", paths.preset_dir.display());
    for path in installed {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Initials that name an existing directory are usually a mistyped argument.
fn confirm_initials(initials: &str, prompter: &mut dyn Prompter) -> Result<()> {
    if Path::new(initials).is_dir() {
        warn!("イニシャル [{initials}] はフォルダ名のようです");
        if !prompter.confirm("このまま続行しますか?")? {
            bail!("中止しました");
        }
    }
    Ok(())
}

fn filter_names(
    ctx: &BatchContext,
    args: &FilterArgs,
    default_mode: FilterMode,
    config: &AppConfig,
    prompter: &mut dyn Prompter,
) -> Result<Filtered<String>> {
    let mode = args.filter.map(FilterMode::from).unwrap_or(default_mode);
    let chunks: Vec<FileNameChunk> = args.check.iter().copied().map(Into::into).collect();
    if !chunks.is_empty() && mode != FilterMode::Formatted {
        bail!("--check は --filter formatted と一緒に指定してください");
    }

    let filter = FileFilter::new().prompt_checkers(&chunks, prompter, &config.defaults)?;
    let filtered = filter.select(mode, ctx.file_names());
    if filtered.is_empty() {
        return Err(BatchError::NothingToProcess.into());
    }
    Ok(filtered)
}

fn resolve_preset(
    exiftool: &mut ExifTool,
    ctx: &BatchContext,
    file_names: &[String],
    args: &PresetArgs,
    config: &AppConfig,
    prompter: &mut dyn Prompter,
) -> Result<CompiledPreset> {
    let preset_dir = match &args.preset_dir {
        Some(dir) => dir.clone(),
        None => config.resolve_preset_dir(&app_paths()?),
    };

    let name = if args.preset == AUTO_PRESET {
        let name = detect_preset(exiftool, ctx, file_names, &config.preset_auto)?;
        if !prompter.confirm(&format!("自動選択されたプリセット [{name}] を使用しますか?"))? {
            bail!("中止しました");
        }
        name
    } else {
        args.preset.clone()
    };

    let preset = Preset::load(&preset_dir, &name)?;
    Ok(compile_preset(&preset)?)
}

fn print_table(plan: &RenamePlan) {
    println!("元ファイル -> 新ファイル");
    for candidate in &plan.candidates {
        println!(
            "{} -> {}",
            candidate.original_path.display(),
            candidate.target_path.display()
        );
    }
    println!(
        "\n集計: scanned={} planned={} skipped={}",
        plan.stats.scanned, plan.stats.planned, plan.stats.skipped
    );
}

fn run_plan(plan: &RenamePlan, keep: bool) -> Result<()> {
    let result = apply_plan(plan, &mut TransferMode::keep_original(keep))?;
    eprintln!(
        "適用完了: {}件 (変更なし {}件)",
        result.applied, result.unchanged
    );
    Ok(())
}

fn print_skipped(skipped: usize) {
    eprintln!("スキップしたファイル: {skipped}件");
}
