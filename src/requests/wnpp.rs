//! requests::wnpp
//!
//! Work-needing and prospective package requests.
//!
//! | Tag | Meaning | Severity | Extra pseudo-headers |
//! |-----|---------|----------|----------------------|
//! | `O` | orphaned | normal (important for required/important/standard packages) | `Control: affects` |
//! | `RFA` | request for adoption | normal | `Control: affects` |
//! | `RFH` | request for help | normal | debian-devel Cc, `Control: affects` |
//! | `ITP` | intent to package | wishlist | debian-devel Cc, `Owner` |
//! | `RFP` | request for package | wishlist | |

use super::{DraftBuilder, DraftSeed, PackageContext, RequestError};
use crate::core::types::{PackageName, Severity};
use crate::pkgdb::PackageStatus;
use crate::ui::prompts::{Choice, Interaction};

/// Mailing list copied on ITP and RFH.
pub const DEVEL_LIST: &str = "debian-devel@lists.debian.org";

const REQUEST_TYPES: &[(&str, &str)] = &[
    ("O", "The package has been `Orphaned'. It needs a new maintainer as soon as possible."),
    ("RFA", "This is a `Request for Adoption'. The current maintainer is asking for someone else to maintain this package, and will maintain it in the meantime."),
    ("RFH", "This is a `Request For Help'. The current maintainer wants to continue to maintain this package, but needs some help to do this."),
    ("ITP", "This is an `Intent To Package'. Please submit a package description along with copyright and URL in such a report."),
    ("RFP", "This is a `Request For Package'. You have found an interesting piece of software and would like someone else to maintain it for Debian."),
];

const ITP_TEMPLATE: &str = "\
* Package name    : {package}
  Version         : x.y.z
  Upstream Author : Name <somebody@example.org>
* URL             : http://www.example.org/
* License         : (GPL, LGPL, BSD, MIT/X, etc.)
  Programming Lang: (C, C++, C#, Perl, Python, etc.)
  Description     : {short_desc}

(Include the long description here.)

Please also include as much relevant information as possible.
For example, consider answering the following questions:
 - why is this package useful/relevant? is it a dependency for
   another package? do you use it? if there are other packages
   providing similar functionality, how does it compare?
 - how do you plan to maintain it? inside a packaging team
   (check list at https://wiki.debian.org/Teams)? are you
   looking for co-maintainers? do you need a sponsor?
";

/// Builder for `wnpp` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct WnppRequest;

fn ask_package(tag: &str, ui: &mut dyn Interaction) -> Result<PackageName, RequestError> {
    let prompt = match tag {
        "ITP" | "RFP" => "Please enter the proposed package name:",
        _ => "Please enter the package name:",
    };
    loop {
        let answer = ui.ask_text(prompt, None)?;
        match PackageName::new(answer.trim()) {
            Ok(name) => return Ok(name),
            Err(_) => ui.display("Invalid package name"),
        }
    }
}

fn ask_short_description(ui: &mut dyn Interaction) -> Result<String, RequestError> {
    loop {
        let answer = ui.ask_text(
            "Please briefly describe this package; this should be an appropriate short description for the eventual package:",
            None,
        )?;
        if !answer.trim().is_empty() {
            return Ok(answer.trim().to_string());
        }
    }
}

fn lookup(ctx: &PackageContext<'_>, package: &PackageName) -> Option<PackageStatus> {
    ctx.db.status(package).ok().flatten()
}

impl WnppRequest {
    fn new_package(
        &self,
        tag: &str,
        ctx: &PackageContext<'_>,
        package: PackageName,
        ui: &mut dyn Interaction,
    ) -> Result<DraftSeed, RequestError> {
        if lookup(ctx, &package).is_some_and(|s| s.installed) {
            let go_on = ui.ask_yes_no(
                &format!(
                    "A package called {} already appears to exist (at least on your system); continue?",
                    package
                ),
                false,
            )?;
            if !go_on {
                return Err(RequestError::Aborted(format!("{} already exists", package)));
            }
        }

        let short_desc = ask_short_description(ui)?;
        let mut pseudo_headers = Vec::new();
        if tag == "ITP" {
            pseudo_headers.push(format!("X-Debbugs-Cc: {}", DEVEL_LIST));
            if let Some(from) = ctx.from {
                pseudo_headers.push(format!("Owner: {}", from));
            }
            ui.display("Your report will be carbon-copied to debian-devel, per Debian policy.");
        }

        let body = ITP_TEMPLATE
            .replace("{package}", package.as_str())
            .replace("{short_desc}", &short_desc);

        Ok(DraftSeed {
            subject: format!("{}: {} -- {}", tag, package, short_desc),
            severity: Some(Severity::Wishlist),
            pseudo_headers,
            body,
            include_template: false,
            ..DraftSeed::default()
        })
    }

    fn existing_package(
        &self,
        tag: &str,
        ctx: &PackageContext<'_>,
        package: PackageName,
        ui: &mut dyn Interaction,
    ) -> Result<DraftSeed, RequestError> {
        let status = lookup(ctx, &package);
        if status.is_none() {
            let go_on = ui.ask_yes_no("This package doesn't appear to exist; continue?", false)?;
            if !go_on {
                return Err(RequestError::Aborted(format!("{} does not exist", package)));
            }
        }

        let name = status
            .as_ref()
            .map(|s| s.source_name().to_string())
            .unwrap_or_else(|| package.to_string());
        let short_desc = status
            .as_ref()
            .and_then(|s| s.description.clone())
            .unwrap_or_default();

        let important = tag == "O"
            && status
                .as_ref()
                .and_then(|s| s.priority.as_deref())
                .is_some_and(|p| matches!(p, "required" | "important" | "standard"));
        let severity = if important {
            Severity::Important
        } else {
            Severity::Normal
        };

        let mut pseudo_headers = Vec::new();
        if tag == "RFH" {
            pseudo_headers.push(format!("X-Debbugs-Cc: {}", DEVEL_LIST));
            ui.display("Your request will be carbon-copied to debian-devel, per Debian policy.");
        }
        pseudo_headers.push(format!("Control: affects -1 src:{}", name));

        let body = match status.as_ref().filter(|s| !s.long_description.is_empty()) {
            Some(s) => {
                let verb = match tag {
                    "RFA" => "request an adopter for",
                    "RFH" => "request assistance with maintaining",
                    _ => "intend to orphan",
                };
                format!(
                    "I {} the {} package.\n\nThe package description is:\n{}\n",
                    verb,
                    name,
                    s.long_description.join("\n")
                )
            }
            None => String::new(),
        };

        let subject = if short_desc.is_empty() {
            format!("{}: {}", tag, name)
        } else {
            format!("{}: {} -- {}", tag, name, short_desc)
        };

        Ok(DraftSeed {
            subject,
            severity: Some(severity),
            pseudo_headers,
            body,
            query_tracker: false,
            include_template: false,
            ..DraftSeed::default()
        })
    }
}

impl DraftBuilder for WnppRequest {
    fn name(&self) -> &'static str {
        "wnpp"
    }

    fn build(
        &self,
        ctx: &PackageContext<'_>,
        ui: &mut dyn Interaction,
    ) -> Result<DraftSeed, RequestError> {
        let choices: Vec<Choice> = REQUEST_TYPES
            .iter()
            .map(|(key, desc)| Choice::new(*key, *desc))
            .collect();
        let tag = ui.ask_choice(
            "What sort of request is this? (Press Enter to exit if none of these apply.)",
            &choices,
            Some(""),
        )?;
        if tag.is_empty() {
            return Err(RequestError::Aborted(
                "to report a bug in a package, use the name of the package, not wnpp".into(),
            ));
        }

        let package = ask_package(&tag, ui)?;
        match tag.as_str() {
            "ITP" | "RFP" => self.new_package(&tag, ctx, package, ui),
            _ => self.existing_package(&tag, ctx, package, ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkgdb::mock::MockPackageDb;
    use crate::requests::test_support::Fixture;
    use crate::ui::prompts::ScriptedUi;

    #[test]
    fn itp_adds_cc_and_owner() {
        let fx = Fixture::new("wnpp");
        let mut ui = ScriptedUi::new(["ITP", "Not A Name", "frobnicator", "frobnicates widgets"]);

        let seed = WnppRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.subject, "ITP: frobnicator -- frobnicates widgets");
        assert_eq!(seed.severity, Some(Severity::Wishlist));
        assert_eq!(
            seed.pseudo_headers,
            vec![
                "X-Debbugs-Cc: debian-devel@lists.debian.org".to_string(),
                "Owner: Jane Doe <jane@example.org>".to_string(),
            ]
        );
        assert!(seed.body.starts_with("* Package name    : frobnicator\n"));
        assert!(seed.body.contains("Description     : frobnicates widgets"));
        assert!(ui.transcript().iter().any(|l| l == "Invalid package name"));
        assert!(seed.query_tracker);
    }

    #[test]
    fn rfp_has_no_extra_pseudo_headers() {
        let fx = Fixture::new("wnpp");
        let mut ui = ScriptedUi::new(["rfp", "gizmo", "", "a gizmo"]);

        let seed = WnppRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.subject, "RFP: gizmo -- a gizmo");
        assert!(seed.pseudo_headers.is_empty());
    }

    #[test]
    fn itp_for_installed_package_can_abort() {
        let mut fx = Fixture::new("wnpp");
        fx.db = MockPackageDb::new().with_installed("gizmo", "1.0");
        let mut ui = ScriptedUi::new(["ITP", "gizmo", "n"]);

        let err = WnppRequest.build(&fx.ctx(), &mut ui).unwrap_err();
        assert!(matches!(err, RequestError::Aborted(_)));
    }

    #[test]
    fn orphan_uses_package_info() {
        let mut fx = Fixture::new("wnpp");
        fx.db = MockPackageDb::new().with_status(PackageStatus {
            package: "libgizmo1".into(),
            version: "1.0-1".into(),
            source: Some("gizmo".into()),
            description: Some("gizmo library".into()),
            long_description: vec!["Runtime files for gizmo.".into()],
            priority: Some("standard".into()),
            installed: true,
            ..Default::default()
        });
        let mut ui = ScriptedUi::new(["O", "libgizmo1"]);

        let seed = WnppRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.subject, "O: gizmo -- gizmo library");
        assert_eq!(seed.severity, Some(Severity::Important));
        assert_eq!(seed.pseudo_headers, vec!["Control: affects -1 src:gizmo".to_string()]);
        assert_eq!(
            seed.body,
            "I intend to orphan the gizmo package.\n\nThe package description is:\nRuntime files for gizmo.\n"
        );
        assert!(!seed.query_tracker);
    }

    #[test]
    fn rfh_for_unknown_package() {
        let fx = Fixture::new("wnpp");
        let mut ui = ScriptedUi::new(["RFH", "ghost", "y"]);

        let seed = WnppRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.subject, "RFH: ghost");
        assert_eq!(seed.severity, Some(Severity::Normal));
        assert_eq!(
            seed.pseudo_headers,
            vec![
                "X-Debbugs-Cc: debian-devel@lists.debian.org".to_string(),
                "Control: affects -1 src:ghost".to_string(),
            ]
        );
        assert!(seed.body.is_empty());
    }

    #[test]
    fn no_request_type_aborts() {
        let fx = Fixture::new("wnpp");
        let mut ui = ScriptedUi::new([""]);
        assert!(matches!(
            WnppRequest.build(&fx.ctx(), &mut ui),
            Err(RequestError::Aborted(_))
        ));
    }
}
