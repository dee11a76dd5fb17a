//! report command - Compose and send a bug report

use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context as _, Result};

use crate::cli::args::{DeliveryArgs, ReportArgs};
use crate::core::config::Config;
use crate::core::systems::TrackerSystem;
use crate::core::types::{BugNumber, Mode, SendTo, Severity};
use crate::engine::{self, Collaborators, Context, ReportSession, SessionOptions, SessionOutcome};
use crate::mailer::{create_transport, DeliveryChannel, Mua, SmtpSettings, DEFAULT_MTA};
use crate::pkgdb::DpkgDatabase;
use crate::report::SystemInfo;
use crate::requests::Presets;
use crate::tracker::OfflineTracker;
use crate::ui::editor::ExternalEditor;
use crate::ui::output;
use crate::ui::prompts::TerminalUi;
use crate::versions::madison::MadisonSource;
use crate::versions::VersionSource;

/// Compose and send a bug report.
pub fn report(ctx: &Context, config: Option<&Path>, args: ReportArgs) -> Result<()> {
    let loaded = Config::load(config).context("Failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            ctx.verbosity(),
        );
    }

    // Use tokio runtime to run async code
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(report_async(ctx, &loaded.config, args))
}

async fn report_async(ctx: &Context, config: &Config, args: ReportArgs) -> Result<()> {
    let ctx = Context {
        offline: ctx.offline || args.offline || config.offline(),
        ..ctx.clone()
    };
    let verbosity = ctx.verbosity();

    let system = match &args.bts {
        Some(name) => TrackerSystem::lookup(name, &config.systems())
            .ok_or_else(|| anyhow!("unknown bug tracking system '{}'", name))?,
        None => config.tracker_system()?,
    };
    output::debug(format!("reporting to {} ({})", system.label, system.name), verbosity);

    let channel = engine::resolve_channel(&system, delivery_channel(&args.delivery, config)?);
    let channel = finish_smtp(&ctx, channel, args.smtptls, args.smtpuser.clone())?;
    output::debug(format!("delivery channel: {:?}", channel), verbosity);
    let options = session_options(config, args)?;

    let db = DpkgDatabase::new();
    let tracker = OfflineTracker;
    let versions: Box<dyn VersionSource> = match config.mirrors().first() {
        Some(url) => Box::new(MadisonSource::with_base_url(url.as_str())?),
        None => Box::new(MadisonSource::new()?),
    };
    let transport = create_transport(channel)?;
    let mut ui = TerminalUi::stdio(ctx.interactive);
    let mut editor = ExternalEditor::resolve(config.editor());

    let mut session = ReportSession::new(
        ctx.clone(),
        system,
        options,
        Collaborators {
            db: &db,
            tracker: &tracker,
            versions: versions.as_ref(),
            ui: &mut ui,
            editor: &mut editor,
            transport: transport.as_ref(),
        },
    );

    match session.run().await? {
        SessionOutcome::Delivered(receipt) if receipt.submitted => {
            output::success(format!("Report sent to {}.", receipt.destination), verbosity);
        }
        SessionOutcome::Delivered(receipt) => {
            output::success(
                format!("Report handed to {} ({}).", receipt.destination, receipt.channel),
                verbosity,
            );
        }
        SessionOutcome::Cancelled(reason) => {
            output::print(format!("Nothing sent: {}.", reason), verbosity);
        }
    }

    Ok(())
}

fn session_options(config: &Config, args: ReportArgs) -> Result<SessionOptions> {
    let severity = match args.severity.as_deref() {
        Some(s) => Some(s.parse::<Severity>().context("invalid --severity")?),
        None => config.severity(),
    };
    let mode = match args.mode.as_deref() {
        Some(m) => m.parse::<Mode>().context("invalid --mode")?,
        None => config.mode(),
    };
    let send_to = match args.send_to.as_deref() {
        Some(s) => s.parse::<SendTo>().context("invalid --send-to")?,
        None => config.send_to(),
    };
    let followup = args
        .followup
        .as_deref()
        .map(str::parse::<BugNumber>)
        .transpose()
        .context("invalid --followup")?;
    let body = args
        .body_file
        .as_deref()
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .transpose()?;

    let mut headers = config.headers().to_vec();
    headers.extend(args.headers);

    Ok(SessionOptions {
        package: args.package,
        presets: Presets {
            subject: args.subject,
            severity,
            tags: args.tags,
        },
        mode,
        followup,
        send_to,
        from: config.from_address(),
        reply_to: config.replyto().map(str::to_string),
        cc: config.cc().to_vec(),
        headers,
        pseudo_headers: args.pseudo_headers,
        body,
        check_available: config.check_available() && !args.no_check_available,
        query_bts: config.query_bts() && !args.no_query_bts,
        system_info: Some(SystemInfo::gather().render()),
        ..SessionOptions::default()
    })
}

/// Channel from flags, then configuration, then the default MTA.
fn delivery_channel(args: &DeliveryArgs, config: &Config) -> Result<DeliveryChannel> {
    let find_mua = |name: &str| {
        Mua::find(name).ok_or_else(|| {
            anyhow!(
                "unknown mail user agent '{}', must be one of: {}",
                name,
                Mua::names().join(", ")
            )
        })
    };

    if args.print {
        return Ok(DeliveryChannel::Print);
    }
    if let Some(path) = &args.output {
        return Ok(DeliveryChannel::File(path.clone()));
    }
    if args.mailto {
        return Ok(DeliveryChannel::Mailto);
    }
    if let Some(name) = &args.mua {
        return Ok(DeliveryChannel::Mua(find_mua(name)?));
    }
    if let Some(path) = &args.mta {
        return Ok(DeliveryChannel::Mta(path.clone()));
    }
    if let Some(host) = &args.smtphost {
        return smtp_channel(host, config);
    }

    if let Some(path) = config.outfile() {
        return Ok(DeliveryChannel::File(path.to_path_buf()));
    }
    if let Some(name) = config.mua() {
        return Ok(DeliveryChannel::Mua(find_mua(name)?));
    }
    if let Some(host) = config.smtphost() {
        return smtp_channel(host, config);
    }
    Ok(DeliveryChannel::Mta(config.mta().unwrap_or(DEFAULT_MTA).into()))
}

fn smtp_channel(host: &str, config: &Config) -> Result<DeliveryChannel> {
    let settings = SmtpSettings::parse(host).context("invalid SMTP host")?;
    Ok(DeliveryChannel::Smtp(SmtpSettings {
        tls: config.smtptls(),
        user: config.smtpuser().map(str::to_string),
        password: config.smtppasswd().map(str::to_string),
        ..settings
    }))
}

/// Apply the SMTP flags and ask for a password the login needs.
fn finish_smtp(
    ctx: &Context,
    channel: DeliveryChannel,
    tls: bool,
    user: Option<String>,
) -> Result<DeliveryChannel> {
    let DeliveryChannel::Smtp(mut settings) = channel else {
        return Ok(channel);
    };
    settings.tls |= tls;
    if user.is_some() {
        settings.user = user;
    }
    if let (Some(user), None) = (&settings.user, &settings.password) {
        settings.password = Some(read_smtp_password(ctx, user, &settings.host)?);
    }
    Ok(DeliveryChannel::Smtp(settings))
}

fn read_smtp_password(ctx: &Context, user: &str, host: &str) -> Result<String> {
    if ctx.quiet || !ctx.interactive {
        bail!("SMTP password required for {}@{}. Set smtppasswd or run interactively.", user, host);
    }

    print!("SMTP password for {}@{}: ", user, host);
    io::stdout().flush()?;

    rpassword::read_password().context("Failed to read SMTP password")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_pick_the_channel() {
        let config = Config::default();
        let args = DeliveryArgs {
            output: Some(PathBuf::from("out.mail")),
            ..Default::default()
        };
        assert_eq!(
            delivery_channel(&args, &config).unwrap(),
            DeliveryChannel::File(PathBuf::from("out.mail"))
        );

        let args = DeliveryArgs {
            mua: Some("mutt".into()),
            ..Default::default()
        };
        assert!(matches!(delivery_channel(&args, &config).unwrap(), DeliveryChannel::Mua(_)));
    }

    #[test]
    fn default_channel_is_sendmail() {
        let channel = delivery_channel(&DeliveryArgs::default(), &Config::default()).unwrap();
        assert_eq!(channel, DeliveryChannel::Mta(PathBuf::from(DEFAULT_MTA)));
    }

    fn smtp_config() -> Config {
        let mut config = Config::default();
        config.user.smtphost = Some("mail.example.org:587".into());
        config.user.smtpuser = Some("jane".into());
        config.user.smtppasswd = Some("hunter2".into());
        config
    }

    #[test]
    fn smtp_host_from_config_or_flag() {
        let channel = delivery_channel(&DeliveryArgs::default(), &smtp_config()).unwrap();
        let DeliveryChannel::Smtp(settings) = channel else {
            panic!("expected smtp");
        };
        assert_eq!(settings.destination(), "mail.example.org:587");
        assert_eq!(settings.user.as_deref(), Some("jane"));
        assert!(!settings.tls);

        let args = DeliveryArgs {
            smtphost: Some("relay.example.org".into()),
            ..Default::default()
        };
        let channel = delivery_channel(&args, &Config::default()).unwrap();
        assert!(matches!(channel, DeliveryChannel::Smtp(s) if s.destination() == "relay.example.org:25"));

        let args = DeliveryArgs {
            mta: Some(PathBuf::from("/usr/sbin/sendmail")),
            ..Default::default()
        };
        assert!(matches!(delivery_channel(&args, &smtp_config()).unwrap(), DeliveryChannel::Mta(_)));
    }

    #[test]
    fn configured_mua_wins_over_smtp() {
        let mut config = smtp_config();
        config.user.mua = Some("mutt".into());
        let channel = delivery_channel(&DeliveryArgs::default(), &config).unwrap();
        assert!(matches!(channel, DeliveryChannel::Mua(_)));
    }

    #[test]
    fn smtp_flags_override_config() {
        let ctx = Context {
            interactive: false,
            ..Context::default()
        };
        let channel = delivery_channel(&DeliveryArgs::default(), &smtp_config()).unwrap();
        let channel = finish_smtp(&ctx, channel, true, Some("root".into())).unwrap();
        let DeliveryChannel::Smtp(settings) = channel else {
            panic!("expected smtp");
        };
        assert!(settings.tls);
        assert_eq!(settings.user.as_deref(), Some("root"));
        assert_eq!(settings.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn batch_login_without_password_fails() {
        let ctx = Context {
            interactive: false,
            ..Context::default()
        };
        let mut config = smtp_config();
        config.user.smtppasswd = None;
        let channel = delivery_channel(&DeliveryArgs::default(), &config).unwrap();

        let err = finish_smtp(&ctx, channel, false, None).unwrap_err();
        assert!(err.to_string().contains("SMTP password required for jane@mail.example.org"));

        let print = finish_smtp(&ctx, DeliveryChannel::Print, true, None).unwrap();
        assert_eq!(print, DeliveryChannel::Print);
    }

    #[test]
    fn unknown_mua_is_rejected() {
        let args = DeliveryArgs {
            mua: Some("outlook".into()),
            ..Default::default()
        };
        let err = delivery_channel(&args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("mutt"));
    }

    #[test]
    fn options_merge_flags_and_config() {
        let args = ReportArgs {
            package: Some("hello".into()),
            severity: Some("serious".into()),
            followup: Some("#1234".into()),
            headers: vec!["X-Test: yes".into()],
            no_check_available: true,
            ..Default::default()
        };
        let options = session_options(&Config::default(), args).unwrap();

        assert_eq!(options.presets.severity, Some(Severity::Serious));
        assert_eq!(options.followup.map(|b| b.get()), Some(1234));
        assert_eq!(options.headers, vec!["X-Test: yes".to_string()]);
        assert!(!options.check_available);
        assert!(options.query_bts);
    }

    #[test]
    fn bad_severity_is_an_error() {
        let args = ReportArgs {
            severity: Some("catastrophic".into()),
            ..Default::default()
        };
        assert!(session_options(&Config::default(), args).is_err());
    }
}
