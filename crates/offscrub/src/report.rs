use offscrub_detect::DetectionReport;
use offscrub_uninstall::ScriptPlan;
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Fact {
    #[tabled(rename = "Property")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl Fact {
    fn new(name: &'static str, value: impl ToString) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

#[derive(Tabled)]
struct Step {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Script")]
    script: &'static str,
    #[tabled(rename = "Arguments")]
    args: &'static str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn detection_table(report: &DetectionReport) -> Table {
    let os = &report.os;
    let mut facts = vec![
        Fact::new("Windows", os.name),
        Fact::new("Build", os.build_number),
        Fact::new("Version", os.windows_number),
        Fact::new("Server", yes_no(os.is_server)),
        Fact::new("Supported", yes_no(os.is_supported)),
        Fact::new("Architecture", report.os_architecture),
    ];

    match &report.office {
        Some(office) => facts.extend([
            Fact::new("Office", office.installation.product),
            Fact::new("Office architecture", office.installation.architecture),
            Fact::new("Install path", office.installation.install_path.display()),
            Fact::new("Click-to-Run", yes_no(office.mechanism.is_virtualized())),
            Fact::new("Office supported", yes_no(office.is_supported)),
            Fact::new("System licensing", yes_no(office.uses_system_licensing_service)),
        ]),
        None => facts.push(Fact::new("Office", "not installed")),
    }

    let mut table = Table::new(facts);
    table.with(Style::rounded());
    table
}

pub fn plan_table(plan: &ScriptPlan) -> Table {
    let steps = plan.steps.iter().enumerate().map(|(i, step)| Step {
        index: i + 1,
        script: step.script,
        args: step.args,
    });

    let mut table = Table::new(steps);
    table.with(Style::rounded());
    table.with(Panel::header(plan.product.name()));
    table
}
