//! requests::installation
//!
//! Installation reports.

use super::{DraftBuilder, DraftSeed, PackageContext, RequestError};
use crate::ui::prompts::Interaction;

const BODY: &str = "\
(Please provide enough information to help the Debian
maintainers evaluate the report efficiently - e.g., by filling
in the sections below.)

Boot method: {boot}
Image version: {image}
Date: <Date and time of the install>

Machine: {machine}
Partitions: <df -Tl will do; the raw partition table is preferred>


Base System Installation Checklist:
[O] = OK, [E] = Error (please elaborate below), [ ] = didn't try it

Initial boot:           [ ]
Detect network card:    [ ]
Configure network:      [ ]
Detect media:           [ ]
Load installer modules: [ ]
Clock/timezone setup:   [ ]
User/password setup:    [ ]
Detect hard drives:     [ ]
Partition hard drives:  [ ]
Install base system:    [ ]
Install tasks:          [ ]
Install boot loader:    [ ]
Overall install:        [ ]

Comments/Problems:

<Description of the install, in prose, and any thoughts, comments
      and ideas you had during the initial install.>


Please make sure that any installation logs that you think would
be useful are attached to this report. Please compress large
files using gzip.
";

/// Builder for `installation-reports`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallationReport;

impl DraftBuilder for InstallationReport {
    fn name(&self) -> &'static str {
        "installation-reports"
    }

    fn build(
        &self,
        _ctx: &PackageContext<'_>,
        ui: &mut dyn Interaction,
    ) -> Result<DraftSeed, RequestError> {
        let boot = ui.ask_text(
            "How did you boot the installer (CD/DVD/USB/network/...)?",
            Some("<boot method (CD/DVD, USB stick, network, etc.)>"),
        )?;
        let image = ui.ask_text(
            "What image did you use to install? (If you can, give its URL and build date)",
            Some("<Full URL to image you downloaded is best>"),
        )?;
        let machine = ui.ask_text(
            "Describe your machine (manufacturer and type):",
            Some("<Description of machine (manufacturer, type)>"),
        )?;

        let body = BODY
            .replace("{boot}", &boot)
            .replace("{image}", &image)
            .replace("{machine}", &machine);

        Ok(DraftSeed {
            body,
            include_template: false,
            ..DraftSeed::default()
        })
    }
}
