mod logging;
mod render;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use render::TextView;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use suivi_api::{HttpTrackingApi, SessionContext, TrackingApi};
use suivi_core::{
    actions, load_screen, AdminScreen, AlertsScreen, DashboardConfig, Loaded, PhasesScreen,
    ProjectsScreen, Refresher, Screen,
};
use suivi_model::{PhaseId, ProjectRef};
use tokio::io::{AsyncBufReadExt, BufReader};

const SCREENS: [&str; 4] = ["phases", "projects", "alerts", "admin"];

fn cli() -> Command {
    Command::new("suivi")
        .version(suivi_core::VERSION)
        .about("Project and phase tracking dashboard")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print views as JSON"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .help("Session token (defaults to $SUIVI_TOKEN)"),
        )
        .arg(
            Arg::new("matricule")
                .long("matricule")
                .global(true)
                .help("Signed-in user (defaults to $SUIVI_MATRICULE)"),
        )
        .subcommand(
            Command::new("phases")
                .about("Phases grouped by project")
                .arg(
                    Arg::new("project")
                        .long("project")
                        .help("Only show this project"),
                ),
        )
        .subcommand(Command::new("projects").about("One status line per project"))
        .subcommand(
            Command::new("alerts")
                .about("Late phases and phases due soon")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .value_parser(value_parser!(u32))
                        .help("Due-soon horizon in days"),
                ),
        )
        .subcommand(
            Command::new("admin")
                .about("Headline counts and weekly leaderboard")
                .arg(
                    Arg::new("top")
                        .long("top")
                        .value_parser(value_parser!(usize))
                        .help("Leaderboard length"),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Reload a screen periodically; press Enter to reload now")
                .arg(
                    Arg::new("screen")
                        .required(true)
                        .value_parser(SCREENS),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and print the session as shell exports")
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Password (defaults to $SUIVI_PASSWORD)"),
                ),
        )
        .subcommand(
            Command::new("complete")
                .about("Record the actual end of a phase")
                .arg(Arg::new("project").required(true))
                .arg(Arg::new("phase").required(true))
                .arg(
                    Arg::new("on")
                        .long("on")
                        .value_parser(value_parser!(NaiveDate))
                        .help("Completion date, YYYY-MM-DD (defaults to today)"),
                ),
        )
        .subcommand(
            Command::new("reopen")
                .about("Clear the actual end of a phase")
                .arg(Arg::new("project").required(true))
                .arg(Arg::new("phase").required(true)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("log-json"));

    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let config = DashboardConfig::load(config_path).context("loading configuration")?;
    let json = matches.get_flag("json");

    let Some((command, args)) = matches.subcommand() else {
        bail!("no command given");
    };

    if command == "login" {
        return login(&config, args, json).await;
    }

    let api: Arc<dyn TrackingApi> = Arc::new(
        HttpTrackingApi::new(&config.api, session(&matches)?)
            .context("building API client")?,
    );

    let ok = match command {
        "phases" => {
            let screen = match args.get_one::<String>("project") {
                Some(project) => PhasesScreen::for_project(project.as_str()),
                None => PhasesScreen::new(),
            };
            show(&screen, api.as_ref(), json).await?
        }
        "projects" => show(&ProjectsScreen, api.as_ref(), json).await?,
        "alerts" => {
            let days = args
                .get_one::<u32>("days")
                .copied()
                .unwrap_or(config.upcoming_days);
            show(&AlertsScreen::new(days), api.as_ref(), json).await?
        }
        "admin" => {
            let top = args
                .get_one::<usize>("top")
                .copied()
                .unwrap_or(config.leaderboard_size);
            show(&AdminScreen::new(top), api.as_ref(), json).await?
        }
        "watch" => {
            let period = config.refresh_interval();
            match args.get_one::<String>("screen").map(String::as_str) {
                Some("phases") => watch(PhasesScreen::new(), api, period, json).await?,
                Some("projects") => watch(ProjectsScreen, api, period, json).await?,
                Some("alerts") => {
                    watch(AlertsScreen::new(config.upcoming_days), api, period, json).await?
                }
                Some("admin") => {
                    watch(AdminScreen::new(config.leaderboard_size), api, period, json).await?
                }
                other => bail!("unknown screen {other:?}"),
            }
            true
        }
        "complete" | "reopen" => {
            edit_phase(command, args, api.as_ref()).await?;
            true
        }
        other => bail!("unknown command {other}"),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn arg_or_env(matches: &ArgMatches, id: &str, var: &str) -> Option<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .or_else(|| std::env::var(var).ok())
}

/// Session from `--token`/`$SUIVI_TOKEN`, plus `--matricule`/`$SUIVI_MATRICULE`
fn session(matches: &ArgMatches) -> Result<SessionContext> {
    resolve_session(
        arg_or_env(matches, "token", "SUIVI_TOKEN"),
        arg_or_env(matches, "matricule", "SUIVI_MATRICULE"),
        Utc::now(),
    )
}

/// Tokens carrying a `matricule` claim stand alone; any other token needs
/// the matricule given next to it. Expired tokens are rejected.
fn resolve_session(
    token: Option<String>,
    matricule: Option<String>,
    now: DateTime<Utc>,
) -> Result<SessionContext> {
    let token = token.context("no session token; run `suivi login` and export SUIVI_TOKEN")?;
    let session = match SessionContext::from_token(token.as_str()) {
        Ok(session) => session,
        Err(e) => match matricule {
            Some(matricule) => {
                tracing::debug!(error = %e, "token does not name its user, using --matricule");
                SessionContext::with_matricule(token, matricule)
            }
            None => {
                return Err(anyhow::Error::new(e).context(
                    "token does not name its user; pass --matricule or set SUIVI_MATRICULE",
                ));
            }
        },
    };
    if session.is_expired(now) {
        bail!(
            "session of {} has expired; run `suivi login` again",
            session.matricule()
        );
    }
    tracing::debug!(matricule = %session.matricule(), "using session");
    Ok(session)
}

async fn login(config: &DashboardConfig, args: &ArgMatches, json: bool) -> Result<()> {
    let matricule = arg_or_env(args, "matricule", "SUIVI_MATRICULE")
        .context("no user; pass --matricule or set SUIVI_MATRICULE")?;
    let password = arg_or_env(args, "password", "SUIVI_PASSWORD")
        .context("no password; pass --password or set SUIVI_PASSWORD")?;

    let session = HttpTrackingApi::login(&config.api, &matricule, &password)
        .await
        .context("signing in")?;
    if json {
        let out = serde_json::json!({
            "matricule": session.matricule(),
            "token": session.token(),
            "role": session.claims().role,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", shell_exports(&session));
    }
    Ok(())
}

/// `export` lines that let later commands reuse `session`
fn shell_exports(session: &SessionContext) -> String {
    format!(
        "export SUIVI_TOKEN={}\nexport SUIVI_MATRICULE={}",
        session.token(),
        session.matricule()
    )
}

async fn edit_phase(command: &str, args: &ArgMatches, api: &dyn TrackingApi) -> Result<()> {
    let project = ProjectRef::from(
        args.get_one::<String>("project")
            .context("missing project")?
            .as_str(),
    );
    let phase = PhaseId::from(
        args.get_one::<String>("phase")
            .context("missing phase")?
            .as_str(),
    );
    if command == "complete" {
        let on = args
            .get_one::<NaiveDate>("on")
            .copied()
            .unwrap_or_else(|| Local::now().date_naive());
        actions::complete_phase(api, &project, &phase, on).await?;
        println!("{project}/{phase} completed on {on}");
    } else {
        actions::reopen_phase(api, &project, &phase).await?;
        println!("{project}/{phase} reopened");
    }
    Ok(())
}

fn print<V: Serialize + TextView>(loaded: &Loaded<V>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(loaded)?);
    } else {
        println!("{}", render::text(loaded));
    }
    Ok(())
}

/// Load once and print; `false` when the load failed
async fn show<S>(screen: &S, api: &dyn TrackingApi, json: bool) -> Result<bool>
where
    S: Screen,
    S::View: TextView,
{
    let loaded = load_screen(screen, api, Local::now().naive_local()).await;
    print(&loaded, json)?;
    Ok(!loaded.is_error())
}

/// Print every published load until Ctrl-C
async fn watch<S>(
    screen: S,
    api: Arc<dyn TrackingApi>,
    period: Duration,
    json: bool,
) -> Result<()>
where
    S: Screen + 'static,
    S::View: TextView,
{
    let (handle, mut rx, task) = Refresher::new(screen, api, period).spawn();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = rx.borrow_and_update().clone();
                if let Some(loaded) = latest {
                    print(&loaded, json)?;
                }
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => handle.request(),
                Ok(None) | Err(_) => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                break;
            }
        }
    }

    task.await.context("refresher task panicked")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    // payload {"matricule":"M1","exp":4102444800}
    const JWT_M1: &str = concat!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.",
        "eyJtYXRyaWN1bGUiOiJNMSIsImV4cCI6NDEwMjQ0NDgwMH0",
        ".sig"
    );
    // payload {"matricule":"M1","exp":1700000000}
    const JWT_EXPIRED: &str = concat!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.",
        "eyJtYXRyaWN1bGUiOiJNMSIsImV4cCI6MTcwMDAwMDAwMH0",
        ".sig"
    );
    // payload {"role":"admin","exp":4102444800}
    const JWT_NO_USER: &str = concat!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.",
        "eyJyb2xlIjoiYWRtaW4iLCJleHAiOjQxMDI0NDQ4MDB9",
        ".sig"
    );

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn opaque_token_from_login_is_usable_with_its_matricule() {
        let session =
            resolve_session(Some("opaque-token".into()), Some("M9".into()), now()).unwrap();
        assert_eq!(session.token(), "opaque-token");
        assert_eq!(session.matricule().as_str(), "M9");
    }

    #[test]
    fn opaque_token_alone_is_rejected() {
        let err = resolve_session(Some("opaque-token".into()), None, now()).unwrap_err();
        assert!(err.to_string().contains("--matricule"), "{err}");
    }

    #[test]
    fn jwt_names_its_own_user() {
        let session = resolve_session(Some(JWT_M1.into()), None, now()).unwrap();
        assert_eq!(session.matricule().as_str(), "M1");
    }

    #[test]
    fn jwt_without_user_claim_falls_back_to_matricule() {
        let session =
            resolve_session(Some(JWT_NO_USER.into()), Some("M2".into()), now()).unwrap();
        assert_eq!(session.matricule().as_str(), "M2");
        assert_eq!(session.claims().role.as_deref(), Some("admin"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = resolve_session(Some(JWT_EXPIRED.into()), None, now()).unwrap_err();
        assert!(err.to_string().contains("expired"), "{err}");
    }

    #[test]
    fn missing_token_is_reported() {
        assert!(resolve_session(None, Some("M1".into()), now()).is_err());
    }

    #[test]
    fn login_output_round_trips_through_resolve_session() {
        let session = SessionContext::with_matricule("opaque-token", "M9");
        let exports = shell_exports(&session);
        assert_eq!(
            exports,
            "export SUIVI_TOKEN=opaque-token\nexport SUIVI_MATRICULE=M9"
        );

        let value = |name: &str| {
            exports
                .lines()
                .find_map(|l| l.strip_prefix(&format!("export {name}=")).map(str::to_string))
        };
        let again =
            resolve_session(value("SUIVI_TOKEN"), value("SUIVI_MATRICULE"), now()).unwrap();
        assert_eq!(again.matricule(), session.matricule());
    }
}
