//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

/// AI group-photo compositing CLI - blend a person into a group photo.
#[derive(Parser, Debug)]
#[command(name = "photoblend", version, about)]
pub struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Blend a person photo into a group photo.
    Blend(BlendArgs),

    /// Register a new account.
    Register {
        /// Username (case-insensitive unique key).
        username: String,
        /// Password (at least 4 characters).
        #[arg(long)]
        password: String,
    },

    /// Log in and keep the session for subsequent commands.
    Login {
        /// Username.
        username: String,
        /// Password.
        #[arg(long)]
        password: String,
    },

    /// Log out, clearing the current session.
    Logout,

    /// Inspect, export, or clear past generations.
    History {
        /// History action; defaults to listing.
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

/// Arguments for the `blend` command.
#[derive(Args, Debug)]
pub struct BlendArgs {
    /// Path to the group photo (the main frame).
    #[arg(long)]
    pub group: String,

    /// Path to the photo of the person to add.
    #[arg(long)]
    pub person: String,

    /// Crop for the group photo: `x,y,WxH`, `x%,y%,W%xH%`, or `default`.
    #[arg(long)]
    pub group_crop: Option<String>,

    /// Crop for the person photo: `x,y,WxH`, `x%,y%,W%xH%`, or `default`.
    #[arg(long)]
    pub person_crop: Option<String>,

    /// Displayed size (`WxH`) the group crop was selected against.
    #[arg(long)]
    pub group_display: Option<String>,

    /// Displayed size (`WxH`) the person crop was selected against.
    #[arg(long)]
    pub person_display: Option<String>,

    /// Resolution tier: standard, hd, ultra_hd.
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Aspect-ratio preference: auto, square, portrait, landscape.
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Model name override.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output file path (blended-photo.png if not specified).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Subcommands of `history`.
#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List past generations, newest first.
    List,
    /// Write a past generation's image to a file.
    Export {
        /// Record id (as shown by `history list`).
        id: String,
        /// Output file path (auto-named if not specified).
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Remove all history for the logged-in user.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_minimal() {
        let cli = Cli::parse_from(["photoblend", "blend", "--group", "g.jpg", "--person", "p.jpg"]);
        let Command::Blend(args) = cli.command else { panic!("expected blend") };
        assert_eq!(args.group, "g.jpg");
        assert_eq!(args.person, "p.jpg");
        assert!(args.resolution.is_none());
        assert!(args.aspect_ratio.is_none());
        assert!(args.person_crop.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn blend_all_options() {
        let cli = Cli::parse_from([
            "photoblend",
            "blend",
            "--group",
            "g.jpg",
            "--person",
            "p.jpg",
            "--person-crop",
            "default",
            "--group-crop",
            "10,10,200x100",
            "--group-display",
            "400x300",
            "-r",
            "hd",
            "-a",
            "Portrait",
            "-o",
            "out.png",
            "-v",
        ]);
        assert!(cli.verbose);
        let Command::Blend(args) = cli.command else { panic!("expected blend") };
        assert_eq!(args.person_crop.as_deref(), Some("default"));
        assert_eq!(args.group_crop.as_deref(), Some("10,10,200x100"));
        assert_eq!(args.group_display.as_deref(), Some("400x300"));
        assert_eq!(args.resolution.as_deref(), Some("hd"));
        assert_eq!(args.aspect_ratio.as_deref(), Some("Portrait"));
        assert_eq!(args.output.as_deref(), Some("out.png"));
    }

    #[test]
    fn register_and_login() {
        let cli = Cli::parse_from(["photoblend", "register", "alice", "--password", "hunter2"]);
        let Command::Register { username, password } = cli.command else {
            panic!("expected register")
        };
        assert_eq!(username, "alice");
        assert_eq!(password, "hunter2");

        let cli = Cli::parse_from(["photoblend", "login", "alice", "--password", "hunter2"]);
        assert!(matches!(cli.command, Command::Login { .. }));
    }

    #[test]
    fn history_defaults_to_list() {
        let cli = Cli::parse_from(["photoblend", "history"]);
        let Command::History { action } = cli.command else { panic!("expected history") };
        assert!(action.is_none());
    }

    #[test]
    fn history_clear_requires_flag_for_confirmation() {
        let cli = Cli::parse_from(["photoblend", "history", "clear"]);
        let Command::History { action: Some(HistoryAction::Clear { yes }) } = cli.command else {
            panic!("expected clear")
        };
        assert!(!yes);

        let cli = Cli::parse_from(["photoblend", "history", "clear", "--yes"]);
        let Command::History { action: Some(HistoryAction::Clear { yes }) } = cli.command else {
            panic!("expected clear")
        };
        assert!(yes);
    }

    #[test]
    fn history_export() {
        let cli = Cli::parse_from(["photoblend", "history", "export", "18f2", "-o", "x.png"]);
        let Command::History { action: Some(HistoryAction::Export { id, output }) } = cli.command
        else {
            panic!("expected export")
        };
        assert_eq!(id, "18f2");
        assert_eq!(output.as_deref(), Some("x.png"));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["photoblend", "logout", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.toml"));
    }
}
