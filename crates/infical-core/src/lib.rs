pub mod calendar;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod commands;
pub mod config;
pub mod constraints;
pub mod date;
pub mod debounce;
pub mod keyboard;
pub mod locale;
pub mod months;
#[cfg(feature = "cli")]
pub mod render;
pub mod scroll;
pub mod selection;
pub mod style;
pub mod theme;
pub mod virtualize;
pub mod years;

pub use calendar::{
  CalendarHooks,
  InfiniteCalendar
};
pub use config::CalendarConfig;

#[cfg(feature = "cli")]
#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<std::ffi::OsString>
) -> anyhow::Result<()> {
  use anyhow::Context;
  use clap::Parser;
  use tracing::{
    debug,
    info
  };

  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting infical"
  );

  let mut cfg = config::CalendarConfig::load(
    cli.config.as_deref()
  )?;
  if cli.multi {
    cfg.multi_date = true;
  }

  let tz = date::resolve_timezone(
    cfg.timezone.as_deref()
  );
  let clock_today = date::today_in(tz);
  let today = match cli.today.as_deref() {
    | Some(raw) => {
      date::parse_date_expr(raw, clock_today)
        .with_context(|| {
          format!("invalid --today: {raw}")
        })?
    }
    | None => clock_today
  };
  debug!(%tz, %today, "resolved today");

  let renderer =
    render::Renderer::new(&cli.color)?;

  commands::dispatch(
    cfg,
    today,
    &renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}
