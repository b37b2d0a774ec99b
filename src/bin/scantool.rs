use barcode_scanner::config::CreationArgs;
use barcode_scanner::models::{
    CaptureFormat, ContactRecord, DetectedSymbol, PermissionState, Rect, Rotation, Symbology,
    VideoGravity,
};
use barcode_scanner::payload::{Action, PayloadRouter};
use barcode_scanner::plugin::{BarcodeScannerPlugin, GET_PLATFORM_VERSION, MethodResult, PlatformInfo};
use barcode_scanner::tools::overlay::save_overlay;
use barcode_scanner::tools::sim::SimPlatform;
use barcode_scanner::tools::{map_region, parse_rect, parse_size, read_payload};
use barcode_scanner::view::ScanViewFactory;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "scantool", version, about = "barcode_scanner CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Permission {
    Unknown,
    Authorized,
    Denied,
}

impl From<Permission> for PermissionState {
    fn from(p: Permission) -> Self {
        match p {
            Permission::Unknown => PermissionState::Unknown,
            Permission::Authorized => PermissionState::Authorized,
            Permission::Denied => PermissionState::Denied,
        }
    }
}

#[derive(clap::Args)]
struct Geometry {
    /// Preview size, WxH
    #[arg(long, value_parser = parse_size)]
    preview: barcode_scanner::Size,
    /// Sensor frame size, WxH
    #[arg(long, value_parser = parse_size)]
    video: barcode_scanner::Size,
    /// Clockwise display rotation in degrees
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    rotation: i32,
    /// fill, aspect or resize
    #[arg(long, default_value = "fill")]
    gravity: VideoGravity,
    /// Scan window x,y,w,h in preview coordinates (default: whole preview)
    #[arg(long, value_parser = parse_rect)]
    region: Option<Rect>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a payload the way a scan view would
    Route {
        /// Payload file, or - for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,
    },
    /// Map a scan window into capture space
    Map {
        #[command(flatten)]
        geometry: Geometry,
    },
    /// Render the mapped rect of interest as a PNG
    Overlay {
        #[command(flatten)]
        geometry: Geometry,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 640)]
        max_side: u32,
    },
    /// Replay a scan session against the simulated platform
    Simulate {
        #[arg(long, value_enum, default_value = "authorized")]
        permission: Permission,
        /// Answer to the permission prompt when permission is unknown
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        grant: bool,
        /// Simulate a device without a camera
        #[arg(long)]
        no_camera: bool,
        /// Payload file, or - for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,
    },
    /// Answer getPlatformVersion
    Version {
        #[arg(long, default_value = "unknown")]
        os_version: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Route { input } => route_cmd(&input),
        Command::Map { geometry } => map_cmd(&geometry),
        Command::Overlay {
            geometry,
            out,
            max_side,
        } => overlay_cmd(&geometry, &out, max_side),
        Command::Simulate {
            permission,
            grant,
            no_camera,
            input,
        } => simulate_cmd(permission.into(), grant, no_camera, &input),
        Command::Version { os_version } => version_cmd(&os_version),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_contact(record: &ContactRecord) {
    println!(
        "  name: {}",
        record.display_name().unwrap_or_else(|| "-".to_string())
    );
    if let Some(org) = &record.organization {
        println!("  organization: {org}");
    }
    if let Some(title) = &record.job_title {
        println!("  title: {title}");
    }
    for phone in &record.phones {
        println!("  phone: {} [{}]", phone.value, phone.labels.join(","));
    }
    for email in &record.emails {
        println!("  email: {} [{}]", email.value, email.labels.join(","));
    }
    for url in &record.urls {
        println!("  url: {}", url.value);
    }
    for adr in &record.addresses {
        let a = &adr.value;
        println!(
            "  address: {}, {} {}, {}",
            a.street, a.postal_code, a.locality, a.country
        );
    }
}

fn route_cmd(input: &Path) -> Result<(), String> {
    let text = read_payload(input).map_err(|e| format!("{}: {e}", input.display()))?;
    match PayloadRouter::new().route(&text) {
        Action::OpenContactEditor(record) => {
            println!("contact");
            print_contact(&record);
        }
        Action::ReportError(err) => println!("contact parse error: {err}"),
        Action::DisplayRawResult(text) => println!("raw: {text}"),
    }
    Ok(())
}

fn mapped(geometry: &Geometry) -> Result<(CaptureFormat, Rect), String> {
    map_region(
        geometry.preview,
        geometry.video,
        geometry.rotation,
        geometry.gravity,
        geometry.region,
    )
}

fn map_cmd(geometry: &Geometry) -> Result<(), String> {
    let (_, roi) = mapped(geometry)?;
    println!(
        "rect of interest: x={:.4} y={:.4} w={:.4} h={:.4}",
        roi.x, roi.y, roi.width, roi.height
    );
    Ok(())
}

fn overlay_cmd(geometry: &Geometry, out: &Path, max_side: u32) -> Result<(), String> {
    let (format, roi) = mapped(geometry)?;
    save_overlay(out, &format, roi, max_side).map_err(|e| e.to_string())?;
    println!("wrote {}", out.display());
    Ok(())
}

fn simulate_cmd(
    permission: PermissionState,
    grant: bool,
    no_camera: bool,
    input: &Path,
) -> Result<(), String> {
    let text = read_payload(input).map_err(|e| format!("{}: {e}", input.display()))?;
    let platform = if no_camera {
        SimPlatform::without_camera(permission)
    } else {
        SimPlatform::new(permission)
    };
    let mut view = ScanViewFactory::from_env()
        .map_err(|e| e.to_string())?
        .create(
            Rect::new(0.0, 0.0, 390.0, 844.0),
            1,
            &CreationArgs::new(),
            platform.services(),
        )
        .map_err(|e| e.to_string())?;

    view.view();
    println!("materialized: {:?}", view.phase());
    if platform.permissions.has_pending_prompt() {
        platform.permissions.answer(grant);
        view.pump();
        println!("permission answered {grant}: {:?}", view.phase());
    }

    platform
        .camera
        .emit_format(CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90));
    platform
        .camera
        .emit_symbols(vec![DetectedSymbol::new(Symbology::Qr, text)]);
    view.pump();
    if let Some(roi) = platform.camera.last_rect_of_interest() {
        println!(
            "rect of interest: x={:.4} y={:.4} w={:.4} h={:.4}",
            roi.x, roi.y, roi.width, roi.height
        );
    }
    println!("after scan: {:?}", view.phase());

    let ui = platform.ui.log();
    for notice in &ui.notices {
        println!("notice: {} - {}", notice.title, notice.message);
    }
    for title in &ui.settings_prompts {
        println!("settings prompt: {title}");
    }
    for record in &ui.editors {
        println!("contact editor:");
        print_contact(record);
    }
    let results = platform.listener.log();
    for raw in &results.raw {
        println!("raw result: {raw}");
    }
    for err in &results.parse_failures {
        println!("contact parse failure (not shown to user): {err}");
    }
    drop(ui);
    drop(results);

    view.dispose();
    Ok(())
}

fn version_cmd(os_version: &str) -> Result<(), String> {
    let plugin = BarcodeScannerPlugin::new(
        PlatformInfo::current(os_version),
        ScanViewFactory::default(),
    );
    match plugin.handle(GET_PLATFORM_VERSION) {
        MethodResult::Success(version) => {
            println!("{version}");
            Ok(())
        }
        MethodResult::NotImplemented => Err("getPlatformVersion not implemented".to_string()),
    }
}
