//! Animated birthday greeting in the terminal
//!
//! Intro messages, a song card, a room reveal, a cake, a photo gallery and
//! a final message, with background music when built with `streaming`.

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!(
        "The happy-birthday binary requires the \"tui\" feature. Rebuild with `--features tui`."
    );
}

#[cfg(feature = "tui")]
mod cli {
    use anyhow::{bail, Context};
    use clap::Parser;
    use happy_birthday::audio::{AudioBackend, SilentBackend};
    use happy_birthday::{tui, GreetingConfig, Session};
    use std::fs::File;
    use std::path::{Path, PathBuf};

    #[derive(Parser, Debug)]
    #[command(name = "happy-birthday")]
    #[command(about = "Play an animated birthday greeting in the terminal")]
    pub struct Args {
        /// JSON greeting config (defaults to the built-in greeting)
        #[arg(short, long, env = "HAPPY_BIRTHDAY_CONFIG")]
        config: Option<PathBuf>,

        /// Audio file for the background track (overrides the config)
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Never open an audio device
        #[arg(long)]
        silent: bool,

        /// Write logs to this file instead of stderr
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Print the effective config as JSON and exit
        #[arg(long)]
        print_config: bool,
    }

    fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
        if let Some(path) = log_file {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        builder.try_init()?;
        Ok(())
    }

    fn load_config(args: &Args) -> anyhow::Result<GreetingConfig> {
        let mut config = match &args.config {
            Some(path) => GreetingConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => GreetingConfig::default(),
        };
        if let Some(audio) = &args.audio {
            config.song.audio_path = Some(audio.clone());
        }
        Ok(config)
    }

    fn silent_backend(config: &GreetingConfig) -> Box<dyn AudioBackend> {
        Box::new(SilentBackend::new(config.song.fallback_duration()))
    }

    #[cfg(feature = "streaming")]
    fn open_backend(config: &GreetingConfig, silent: bool) -> Box<dyn AudioBackend> {
        use happy_birthday::RodioBackend;

        match (&config.song.audio_path, silent) {
            (Some(path), false) => match RodioBackend::open(path) {
                Ok(backend) => Box::new(backend),
                Err(e) => {
                    log::warn!("audio unavailable ({e}), continuing without sound");
                    silent_backend(config)
                }
            },
            _ => silent_backend(config),
        }
    }

    #[cfg(not(feature = "streaming"))]
    fn open_backend(config: &GreetingConfig, silent: bool) -> Box<dyn AudioBackend> {
        if config.song.audio_path.is_some() && !silent {
            log::warn!("built without the \"streaming\" feature, audio file ignored");
        }
        silent_backend(config)
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();
        init_logging(args.log_file.as_deref())?;

        let config = load_config(&args)?;
        if args.print_config {
            println!("{}", config.to_json_pretty()?);
            return Ok(());
        }

        if !tui::terminal_supports_tui() {
            bail!(
                "terminal too small, need at least {}x{}",
                tui::MIN_COLS,
                tui::MIN_ROWS
            );
        }

        let backend = open_backend(&config, args.silent);
        let mut session = Session::new(config, backend).context("invalid greeting config")?;
        let result = tui::run(&mut session);
        session.shutdown();
        result.context("terminal error")?;
        Ok(())
    }
}

#[cfg(feature = "tui")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
