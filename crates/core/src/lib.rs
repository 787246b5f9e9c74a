mod apply;
mod checker;
mod config;
mod context;
mod exiftool;
mod filename;
mod filter;
mod metadata;
mod output;
mod planner;
mod preset;
mod prompt;
mod rating;
mod report;
mod sequence;
mod sidecar;
mod style;
mod template;

pub use apply::{apply_plan, ApplyResult, Transfer, TransferMode};
pub use checker::{chunk_default, prompt_chunk_value, Checker};
pub use config::{
    app_paths, load_config, save_config, AppConfig, AppPaths, ChunkDefaults, PresetAutoConfig,
    DEFAULT_EXTENSION,
};
pub use context::{BatchContext, BatchError};
pub use exiftool::{ExifTool, ExifToolError};
pub use filename::{
    CanonicalName, FileNameChunk, FileNameError, NameDescription, DATE_TIME_FORMAT, DELIMITER,
    MAX_SEQUENCE,
};
pub use filter::{FileFilter, FilterMode, Filtered, FormattedEntry};
pub use metadata::{
    capture_timestamp, parse_tag_json, MetadataReader, TagMap, DATE_TIME_ORIGINAL, FILE_NAME,
    FILE_TYPE, MAKE, MODEL, OFFSET_TIME_ORIGINAL,
};
pub use output::{prepare_output_dir, write_file_list, FILE_LIST_NAME};
pub use planner::{
    plan_field_edit, plan_full_rename, plan_transfer, EditMode, RenameCandidate, RenamePlan,
    RenameStats,
};
pub use preset::{
    available_presets, bundled_preset_names, compile_preset, detect_preset,
    install_bundled_presets, select_preset, CompiledLine, CompiledPreset, Preset, PresetCell,
    PresetError, AUTO_PRESET,
};
pub use prompt::{resolve_choice, Prompter};
pub use rating::Rating;
pub use report::{render_report, write_texif_simple, RenderedReport, ReportLevel};
pub use sequence::{assign_sequences, SequenceAssigner, SENTINEL_TIMESTAMP};
pub use sidecar::{write_exif_sidecars, write_texif_full};
pub use style::Style;
pub use template::{parse_template, render_template, TemplateError, TemplatePart};
