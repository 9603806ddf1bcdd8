//! zrgb - Multi-zone RGB lighting control for gaming handhelds.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use console::style;
use serde::Serialize;

use zrgb::backend::{
    JsonStore, LightingBackend, LogBackend, Mode, ModeCapabilities, SettingsStore,
};
use zrgb::cli::{
    AcSplitArgs, Cli, Commands, CompletionsArgs, OverrideArgs, PresetCommands, SetArgs,
    SettingsCommands,
};
use zrgb::error::{LightError, Result};
use zrgb::layout::{self, DeviceKind};
use zrgb::logging::init_logging;
use zrgb::preset::{PresetStore, PresetStoreConfig};
use zrgb::settings::SettingsService;
use zrgb::timeline::CustomRgbConfig;

fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }

    init_logging(cli.json, cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::Info) => cmd_info(cli),
        Some(Commands::Modes) => cmd_modes(cli),
        Some(Commands::Set(args)) => cmd_set(cli, args),
        Some(Commands::Override(args)) => cmd_override(cli, args),
        Some(Commands::AcSplit(args)) => cmd_ac_split(cli, args),
        Some(Commands::Preset(command)) => cmd_preset(cli, command),
        Some(Commands::Settings(command)) => cmd_settings(cli, command),
        Some(Commands::Completions(args)) => cmd_completions(args),
    }
}

/// Everything a command needs: the store, the driver stand-in, and the two
/// service objects wired to them.
struct Context {
    device: DeviceKind,
    store: Arc<JsonStore>,
    settings: SettingsService,
    presets: PresetStore,
}

fn context(cli: &Cli) -> Result<Context> {
    let device = DeviceKind::from_capability(&cli.device);
    let store = Arc::new(match &cli.data_dir {
        Some(dir) => JsonStore::open(dir)?,
        None => JsonStore::open_default()?,
    });
    let backend = Arc::new(LogBackend::new(device));

    let mut settings = SettingsService::new(
        Arc::clone(&store) as Arc<dyn SettingsStore>,
        Arc::clone(&backend) as Arc<dyn LightingBackend>,
    );
    settings.set_current_app(&cli.app);
    settings.set_power_state(cli.power.into());

    let mut presets = PresetStore::new(
        PresetStoreConfig::for_device(device),
        Arc::clone(&store) as Arc<dyn SettingsStore>,
        backend as Arc<dyn LightingBackend>,
    );
    presets.init();

    Ok(Context {
        device,
        store,
        settings,
        presets,
    })
}

fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| LightError::Other(format!("serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}

// === Quick start ===

fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.json {
        #[derive(Serialize)]
        struct QuickStart {
            tool: &'static str,
            version: &'static str,
            discovery: [&'static str; 2],
            lighting: [&'static str; 3],
            presets: [&'static str; 3],
        }
        return emit_json(&QuickStart {
            tool: "zrgb",
            version: env!("CARGO_PKG_VERSION"),
            discovery: ["zrgb info", "zrgb modes"],
            lighting: [
                "zrgb set --hue 120 --saturation 100 --brightness 80",
                "zrgb set --mode breathing --speed 12",
                "zrgb --app <ID> override <ID>",
            ],
            presets: [
                "zrgb preset save <NAME> timeline.json",
                "zrgb preset apply <NAME>",
                "zrgb preset list",
            ],
        });
    }

    println!(
        "{} {} - handheld RGB lighting control\n",
        style("zrgb").bold().cyan(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("QUICK START").bold().underlined());
    println!();
    println!("  {}  Device capabilities", style("zrgb info").green());
    println!("  {}  Set a solid color", style("zrgb set --hue 120").green());
    println!("  {}  List saved presets", style("zrgb preset list").green());
    println!(
        "  {}  Apply an animated preset",
        style("zrgb preset apply wave").green()
    );
    println!();
    println!("Use {} for machine-readable output.", style("--json").cyan());
    Ok(())
}

// === Discovery ===

fn cmd_info(cli: &Cli) -> Result<()> {
    let device = DeviceKind::from_capability(&cli.device);
    let backend = LogBackend::new(device);
    let caps = backend.capabilities();
    let layout = layout::layout_for(device);

    #[derive(Serialize)]
    struct ZoneInfo {
        index: usize,
        group: &'static str,
        label: &'static str,
        angle: f32,
    }

    #[derive(Serialize)]
    struct Info {
        device: &'static str,
        zones: usize,
        custom_rgb: bool,
        max_keyframes: usize,
        zone_layout: Vec<ZoneInfo>,
    }

    let info = Info {
        device: device.display_name(),
        zones: caps.zones,
        custom_rgb: caps.custom_rgb,
        max_keyframes: device.max_keyframes(),
        zone_layout: layout
            .zones
            .iter()
            .map(|z| ZoneInfo {
                index: z.index,
                group: z.group,
                label: z.label,
                angle: z.angle,
            })
            .collect(),
    };

    if cli.json {
        return emit_json(&info);
    }
    println!("{}", style(info.device).bold());
    println!("  zones:         {}", info.zones);
    println!("  custom rgb:    {}", info.custom_rgb);
    println!("  max keyframes: {}", info.max_keyframes);
    println!();
    for zone in &info.zone_layout {
        println!(
            "  [{}] {:<3} {:<12} {:>5.0} deg",
            zone.index, zone.label, zone.group, zone.angle
        );
    }
    Ok(())
}

fn cmd_modes(cli: &Cli) -> Result<()> {
    #[derive(Serialize)]
    struct ModeInfo {
        mode: &'static str,
        #[serde(flatten)]
        capabilities: ModeCapabilities,
    }

    let modes: Vec<ModeInfo> = Mode::ALL
        .iter()
        .map(|m| ModeInfo {
            mode: m.display_name(),
            capabilities: m.capabilities(),
        })
        .collect();

    if cli.json {
        return emit_json(&modes);
    }
    println!(
        "{:<10} {:>5} {:>6} {:>5} {:>10}  zones",
        style("mode").bold(),
        "color",
        "color2",
        "speed",
        "level"
    );
    for info in &modes {
        println!(
            "{:<10} {:>5} {:>6} {:>5} {:>10}  {}",
            info.mode,
            info.capabilities.color,
            info.capabilities.color2,
            info.capabilities.speed,
            info.capabilities.brightness_level,
            info.capabilities.zones.join(", ")
        );
    }
    Ok(())
}

// === Setting writes ===

fn cmd_set(cli: &Cli, args: &SetArgs) -> Result<()> {
    let mut ctx = context(cli)?;

    if let Some(mode) = args.mode {
        ctx.settings.set_mode(mode.into());
    }
    if let Some(hue) = args.hue {
        ctx.settings.set_hue(hue)?;
    }
    if let Some(saturation) = args.saturation {
        ctx.settings.set_saturation(saturation)?;
    }
    if let Some(brightness) = args.brightness {
        ctx.settings.set_brightness(brightness)?;
    }
    if let Some(speed) = args.speed {
        ctx.settings.set_speed(speed)?;
    }
    if let Some(level) = args.brightness_level {
        ctx.settings.set_brightness_level(level)?;
    }

    if !args.no_apply {
        ctx.settings.apply_now()?;
    }

    #[derive(Serialize)]
    struct Resolved<'a> {
        app: &'a str,
        power: zrgb::settings::PowerState,
        mode: Mode,
        hue: f32,
        saturation: f32,
        brightness: f32,
        speed: u8,
        brightness_level: u8,
        color: String,
    }

    let resolved = Resolved {
        app: ctx.settings.current_app(),
        power: ctx.settings.power_state(),
        mode: ctx.settings.mode(),
        hue: ctx.settings.hue(),
        saturation: ctx.settings.saturation(),
        brightness: ctx.settings.brightness(),
        speed: ctx.settings.speed(),
        brightness_level: ctx.settings.brightness_level(),
        color: ctx.settings.current().primary_rgb().to_string(),
    };

    if cli.json {
        return emit_json(&resolved);
    }
    println!(
        "{} mode={} hue={:.0} sat={:.0} bright={:.0} speed={} color={}",
        style("ok").green().bold(),
        resolved.mode.display_name(),
        resolved.hue,
        resolved.saturation,
        resolved.brightness,
        resolved.speed,
        style(&resolved.color).bold()
    );
    Ok(())
}

fn cmd_override(cli: &Cli, args: &OverrideArgs) -> Result<()> {
    let mut ctx = context(cli)?;
    ctx.settings.set_app_overwrite(&args.app_id, !args.disable);
    if !cli.json {
        println!(
            "per-app override {} for {}",
            if args.disable { "disabled" } else { "enabled" },
            style(&args.app_id).bold()
        );
    }
    Ok(())
}

fn cmd_ac_split(cli: &Cli, args: &AcSplitArgs) -> Result<()> {
    let mut ctx = context(cli)?;
    ctx.settings.set_ac_state_overwrite(!args.disable);
    if !cli.json {
        println!(
            "AC/battery split {}",
            if args.disable { "disabled" } else { "enabled" }
        );
    }
    Ok(())
}

// === Presets ===

fn cmd_preset(cli: &Cli, command: &PresetCommands) -> Result<()> {
    let mut ctx = context(cli)?;
    match command {
        PresetCommands::List => {
            #[derive(Serialize)]
            struct Entry<'a> {
                name: &'a str,
                keyframes: usize,
                speed: u8,
                active: bool,
            }
            let active = ctx.settings.active_preset().map(ToOwned::to_owned);
            let entries: Vec<Entry<'_>> = ctx
                .presets
                .names()
                .into_iter()
                .filter_map(|name| {
                    ctx.presets.get(name).map(|p| Entry {
                        name,
                        keyframes: p.keyframe_count(),
                        speed: p.speed,
                        active: active.as_deref() == Some(name),
                    })
                })
                .collect();
            if cli.json {
                return emit_json(&entries);
            }
            if entries.is_empty() {
                println!("no presets saved for {}", ctx.device.display_name());
                return Ok(());
            }
            for entry in entries {
                let marker = if entry.active { "*" } else { " " };
                println!(
                    "{marker} {:<20} {} keyframes, speed {}",
                    style(entry.name).bold(),
                    entry.keyframes,
                    entry.speed
                );
            }
            Ok(())
        }
        PresetCommands::Show { name } => {
            let preset = ctx
                .presets
                .get(name)
                .ok_or_else(|| LightError::PresetNotFound { name: name.clone() })?;
            emit_json(preset)
        }
        PresetCommands::Save { name, file } => {
            let contents = std::fs::read_to_string(file)?;
            let config: CustomRgbConfig = serde_json::from_str(&contents)
                .map_err(|e| LightError::SettingsParse(format!("{}: {e}", file.display())))?;
            validate_timeline(&config, ctx.device)?;
            if !ctx.presets.save(name, config) {
                return Err(LightError::Store(format!("failed to save preset '{name}'")));
            }
            if !cli.json {
                println!("saved preset {}", style(name).bold());
            }
            Ok(())
        }
        PresetCommands::Delete { name } => {
            if ctx.presets.get(name).is_none() {
                return Err(LightError::PresetNotFound { name: name.clone() });
            }
            if !ctx.presets.delete(name, &mut ctx.settings) {
                return Err(LightError::Store(format!("failed to delete preset '{name}'")));
            }
            if !cli.json {
                println!("deleted preset {}", style(name).bold());
            }
            Ok(())
        }
        PresetCommands::Apply { name } => {
            if ctx.presets.get(name).is_none() {
                return Err(LightError::PresetNotFound { name: name.clone() });
            }
            if !ctx.presets.apply(name, &mut ctx.settings) {
                return Err(LightError::Backend(format!("failed to apply preset '{name}'")));
            }
            if !cli.json {
                println!("applied preset {}", style(name).bold());
            }
            Ok(())
        }
        PresetCommands::Preview { name, frame } => {
            if ctx.presets.get(name).is_none() {
                return Err(LightError::PresetNotFound { name: name.clone() });
            }
            ctx.presets.start_editing(Some(name));
            let ok = match frame {
                Some(index) => ctx.presets.preview_frame(*index),
                None => ctx.presets.preview_current(),
            };
            ctx.presets.cancel_editing();
            if !ok {
                return Err(LightError::Backend(format!(
                    "failed to preview preset '{name}'"
                )));
            }
            if !cli.json {
                println!("previewed preset {}", style(name).bold());
            }
            Ok(())
        }
    }
}

fn validate_timeline(config: &CustomRgbConfig, device: DeviceKind) -> Result<()> {
    if config.keyframes.is_empty() || config.keyframes.len() > device.max_keyframes() {
        return Err(LightError::Other(format!(
            "timeline must have 1-{} keyframes, found {}",
            device.max_keyframes(),
            config.keyframes.len()
        )));
    }
    for keyframe in &config.keyframes {
        if keyframe.zone_count() != device.zone_count() {
            return Err(LightError::ZoneCountMismatch {
                expected: device.zone_count(),
                actual: keyframe.zone_count(),
            });
        }
    }
    if config.speed > zrgb::timeline::SPEED_MAX {
        return Err(LightError::InvalidSpeed {
            value: config.speed,
        });
    }
    Ok(())
}

// === Settings tree ===

fn cmd_settings(cli: &Cli, command: &SettingsCommands) -> Result<()> {
    let ctx = context(cli)?;
    match command {
        SettingsCommands::Path => {
            println!("{}", ctx.store.settings_path().display());
            Ok(())
        }
        SettingsCommands::Show => emit_json(ctx.settings.data()),
    }
}

// === Utilities ===

fn cmd_completions(args: &CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(args.shell, &mut command, "zrgb", &mut io::stdout());
    Ok(())
}

// === Error output ===

fn output_error(cli: &Cli, error: &LightError) {
    if cli.json {
        #[derive(Serialize)]
        struct ErrorOutput<'a> {
            error: String,
            recoverable: bool,
            suggestion: Option<&'a str>,
        }
        let payload = ErrorOutput {
            error: error.to_string(),
            recoverable: error.is_user_recoverable(),
            suggestion: error.suggestion(),
        };
        if let Ok(json) = serde_json::to_string_pretty(&payload) {
            let _ = writeln!(io::stderr(), "{json}");
        }
        return;
    }

    let _ = writeln!(io::stderr(), "{} {error}", style("error:").red().bold());
    if let Some(suggestion) = error.suggestion() {
        let _ = writeln!(io::stderr(), "  {} {suggestion}", style("hint:").yellow());
    }
}
