//! # Favicon 打包工具 — 命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与文件读写。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use favicon_packager::error::AppError;
use favicon_packager::favicon::{
    load_from_file, FaviconConfig, FaviconHandler, IconDirectory, PackageOutput, PerformanceProfile,
    PngCodec, TargetSizes, ZipArchiveWriter, STANDARD_SIZES,
};
use favicon_packager::settings;

#[derive(Parser, Debug)]
#[command(name = "favicon-packager", version, about = "Pack images into .ico favicons")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 生成 .ico（单尺寸）或 .zip（多尺寸）
    Generate {
        /// 源图片路径
        input: PathBuf,
        /// 目标尺寸，可重复或逗号分隔（1~256）
        #[arg(short, long, value_delimiter = ',')]
        sizes: Vec<u32>,
        /// 输出目录
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// 性能档位：quality / balanced / speed
        #[arg(short, long)]
        profile: Option<String>,
        /// JSON 设置文件
        #[arg(long)]
        settings: Option<PathBuf>,
        /// 将所有尺寸合并到一个 .ico 中
        #[arg(long)]
        combined: bool,
        /// 关闭多尺寸并行
        #[arg(long)]
        sequential: bool,
    },
    /// 打印 .ico 文件的目录结构
    Inspect {
        /// .ico 文件路径
        input: PathBuf,
    },
    /// 列出标准尺寸
    Sizes,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Generate {
            input,
            sizes,
            out_dir,
            profile,
            settings,
            combined,
            sequential,
        } => generate(GenerateArgs {
            input,
            sizes,
            out_dir,
            profile,
            settings,
            combined,
            sequential,
        }),
        Command::Inspect { input } => inspect(&input),
        Command::Sizes => {
            let listed: Vec<String> = STANDARD_SIZES.iter().map(|s| format!("{s}x{s}")).collect();
            println!("{}", listed.join(" "));
            Ok(())
        }
    }
}

struct GenerateArgs {
    input: PathBuf,
    sizes: Vec<u32>,
    out_dir: PathBuf,
    profile: Option<String>,
    settings: Option<PathBuf>,
    combined: bool,
    sequential: bool,
}

fn generate(args: GenerateArgs) -> Result<(), AppError> {
    let mut config = FaviconConfig::default();
    let mut sizes = TargetSizes::default_selection();

    if let Some(path) = &args.settings {
        match settings::load_settings(path)? {
            Some(loaded) => {
                loaded.apply(&mut config)?;
                if let Some(from_file) = loaded.target_sizes()? {
                    sizes = from_file;
                }
                log::info!("⚙️ 已加载设置文件: {}", path.display());
            }
            None => log::warn!("设置文件不存在，使用默认配置: {}", path.display()),
        }
    }

    if let Some(name) = &args.profile {
        let profile = PerformanceProfile::from_str(name)?;
        config.apply_performance_profile(profile);
    }
    if args.sequential {
        config.parallel_sizes = false;
    }
    if !args.sizes.is_empty() {
        sizes = TargetSizes::new(args.sizes.iter().copied())?;
    }

    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            AppError::InvalidArgument(format!("输入路径缺少文件名: {}", args.input.display()))
        })?;

    let source = load_from_file(&args.input, &config)?;

    let profile = config.infer_performance_profile();
    let handler = FaviconHandler::with_collaborators(
        config,
        PngCodec::new(profile.png_compression()),
        ZipArchiveWriter::new(profile.archive_compression_level()),
    );

    fs::create_dir_all(&args.out_dir)?;

    let file = if args.combined {
        handler.package_combined(&source, &file_name, &sizes)?
    } else {
        let output = handler.package(&source, &file_name, &sizes)?;
        if let PackageOutput::Archive { entries, .. } = &output {
            log::info!("📦 归档内容: {}", entries.join(", "));
        }
        output.into_file()
    };

    let target = args.out_dir.join(&file.file_name);
    fs::write(&target, &file.bytes)?;
    println!("{} ({} bytes)", target.display(), file.bytes.len());

    Ok(())
}

fn inspect(path: &Path) -> Result<(), AppError> {
    let bytes = fs::read(path)?;
    let directory = IconDirectory::parse(&bytes)?;

    println!(
        "{}: type={} entries={} bytes={}",
        path.display(),
        directory.resource_type,
        directory.len(),
        bytes.len()
    );
    for (idx, record) in directory.records.iter().enumerate() {
        println!(
            "  #{idx} {}x{} bpp={} planes={} size={} offset={}",
            record.width,
            record.height,
            record.bits_per_pixel,
            record.planes,
            record.payload_size,
            record.payload_offset
        );
    }

    Ok(())
}
