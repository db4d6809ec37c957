use std::ffi::OsString;
use std::path::PathBuf;

pub use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Config file; defaults to $PYCOTERM_CONFIG_PATH or ~/.pycoterm/config
    #[clap(short = 'c', long, help = "config file path")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<AppCommand>,
}

/// What to run; no subcommand starts the terminal front-end
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Download pyco.py and README.md into the install directory
    Setup,
    /// Manage the offline asset cache of the web variant
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheAction {
    /// Fetch every manifest asset into a fresh cache
    Install {
        /// JSON manifest replacing the built-in asset list
        #[clap(short = 'm', long)]
        manifest: Option<PathBuf>,
    },
    /// Delete caches left behind by older versions
    Activate,
    /// Serve one request the way the web worker would
    Fetch {
        url: String,
        #[clap(short = 'X', long, default_value = "GET")]
        method: String,
    },
    /// List cache names on disk
    List,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    config: Option<String>,
    command: Option<AppCommand>,
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        Self::from_clap(ClapArgs::parse())
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_clap(ClapArgs::parse_from(itr))
    }

    fn from_clap(args: ClapArgs) -> Self {
        Self {
            config: args.config,
            command: args.command,
        }
    }

    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn command(&self) -> Option<&AppCommand> {
        self.command.as_ref()
    }
}
