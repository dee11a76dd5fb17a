//! requests::upgrade
//!
//! Upgrade reports. The body is a fixed questionnaire.

use super::{DraftBuilder, DraftSeed, PackageContext, RequestError};
use crate::ui::prompts::Interaction;

const BODY: &str = "\
(Please provide enough information to help the Debian
maintainers evaluate the report efficiently - e.g., by filling
in the sections below.)

My previous release is: <codename or version from which you are upgrading>
I am upgrading to: <codename or version of the release you are upgrading to>
Archive date: <Timestamp, available as project/trace/ftp-master.debian.org
     on your mirror or .disk/info on your CD/DVD set>
Upgrade date: <Date and time of the upgrade>
uname -a before upgrade: <The result of running uname -a on a shell prompt>
uname -a after upgrade: <The result of running uname -a on a shell prompt>
Method: <How did you upgrade?  Which program did you use?>

Contents of /etc/apt/sources.list:


- Were there any non-Debian packages installed before the upgrade?  If
  so, what were they?

- Was the system pre-update a 'pure' system only containing packages
  from the previous release? If not, which packages were not from that
  release?

- Did any packages fail to upgrade?

- Were there any problems with the system after upgrading?


Further Comments/Problems:


Please attach the output of \"COLUMNS=200 dpkg -l\" (or \"env COLUMNS ...\",
depending on your shell) from before and after the upgrade so that we
know what packages were installed on your system.
";

/// Builder for `upgrade-reports`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpgradeReport;

impl DraftBuilder for UpgradeReport {
    fn name(&self) -> &'static str {
        "upgrade-reports"
    }

    fn build(
        &self,
        _ctx: &PackageContext<'_>,
        _ui: &mut dyn Interaction,
    ) -> Result<DraftSeed, RequestError> {
        Ok(DraftSeed {
            body: BODY.to_string(),
            include_template: false,
            ..DraftSeed::default()
        })
    }
}
