use anyhow::Result;
use tracing_subscriber::EnvFilter;

use kit_statusline::cli::{Args, GitBackendArg};
use kit_statusline::display::{
    Theme, build_json_output, print_json_output, print_text_output, render_line,
};
use kit_statusline::git::{CommandGit, GitProbe, read_git_status};
use kit_statusline::models::HookJson;
use kit_statusline::utils::{home_dir, read_payload};

fn init_tracing(debug: bool) {
    if !debug {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kit_statusline=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn git_probe(args: &Args) -> Box<dyn GitProbe> {
    match args.git_backend {
        GitBackendArg::Command => Box::new(CommandGit::new(args.git_timeout())),
        #[cfg(feature = "gix")]
        GitBackendArg::Gix => Box::new(kit_statusline::git::GixGit),
    }
}

fn main() -> Result<()> {
    let args = Args::load();
    init_tracing(args.debug);

    let raw = read_payload();
    let input = HookJson::parse(&raw).status_input();
    tracing::debug!(?input, "extracted fields");

    let probe = git_probe(&args);
    let git = read_git_status(probe.as_ref(), &input.cwd);
    let home = home_dir().unwrap_or_default();

    let written = if args.json {
        print_json_output(&build_json_output(&input, git.as_ref(), &home, args.bar_width()))
    } else {
        let theme = Theme::new(args.color_enabled());
        let line = render_line(&input, git.as_ref(), &home, &theme, args.bar_width());
        print_text_output(&line)
    };
    // A closed stdout is not worth a failing exit status.
    if let Err(err) = written {
        tracing::warn!(error = %err, "failed to write status line");
    }
    Ok(())
}
