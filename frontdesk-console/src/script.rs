//! 会话脚本解析
//!
//! 每行一条命令，`#` 开头的行和空行忽略

use anyhow::{anyhow, bail, Context, Result};
use frontdesk_core::{JourneyStatus, PatientRegistration};
use frontdesk_journey::JourneyFilter;
use std::str::FromStr;

/// 会话命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `register <name> | <department> [| <doctor>] [| <id>]`
    Register(RegisterArgs),
    /// `advance <id> <index|stage name>`
    Advance { patient_id: String, stage: StageTarget },
    /// `next <id>`
    Next { patient_id: String },
    /// `status <id> <status>`
    Status { patient_id: String, status: JourneyStatus },
    /// `show <id>`
    Show { patient_id: String },
    /// `board [status] [dept=..] [search=..] [stage=..] [sort=..] [desc]`
    Board(JourneyFilter),
    /// `stats`
    Stats,
}

/// 推进目标：阶段索引或阶段名称
#[derive(Debug, Clone, PartialEq)]
pub enum StageTarget {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterArgs {
    pub name: String,
    pub department: String,
    pub doctor: Option<String>,
    pub id: Option<String>,
}

impl From<RegisterArgs> for PatientRegistration {
    fn from(args: RegisterArgs) -> Self {
        let mut registration = PatientRegistration::new(args.name, args.department);
        registration.doctor = args.doctor;
        registration.id = args.id;
        registration
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match verb.to_ascii_lowercase().as_str() {
            "register" => parse_register(rest).map(Command::Register),
            "advance" => match args.as_slice() {
                [id, stage @ ..] if !stage.is_empty() => {
                    let stage = stage.join(" ");
                    let stage = match stage.parse::<usize>() {
                        Ok(index) => StageTarget::Index(index),
                        Err(_) if stage.starts_with(|c: char| c.is_ascii_digit()) => {
                            bail!("stage index '{}' is not a number", stage)
                        }
                        Err(_) => StageTarget::Name(stage),
                    };
                    Ok(Command::Advance {
                        patient_id: id.to_string(),
                        stage,
                    })
                }
                _ => bail!("usage: advance <id> <index|stage name>"),
            },
            "next" => match args.as_slice() {
                [id] => Ok(Command::Next { patient_id: id.to_string() }),
                _ => bail!("usage: next <id>"),
            },
            "status" => match args.as_slice() {
                [id, status] => Ok(Command::Status {
                    patient_id: id.to_string(),
                    status: status.parse()?,
                }),
                _ => bail!("usage: status <id> <waiting|in-progress|completed|delayed>"),
            },
            "show" => match args.as_slice() {
                [id] => Ok(Command::Show { patient_id: id.to_string() }),
                _ => bail!("usage: show <id>"),
            },
            "board" => parse_board(&args).map(Command::Board),
            "stats" if args.is_empty() => Ok(Command::Stats),
            other => Err(anyhow!("unknown command '{}'", other)),
        }
    }
}

fn parse_register(rest: &str) -> Result<RegisterArgs> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let optional = |i: usize| {
        fields
            .get(i)
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
    };

    match fields.as_slice() {
        [name, department, ..]
            if fields.len() <= 4 && !name.is_empty() && !department.is_empty() =>
        {
            Ok(RegisterArgs {
                name: name.to_string(),
                department: department.to_string(),
                doctor: optional(2),
                id: optional(3),
            })
        }
        _ => bail!("usage: register <name> | <department> [| <doctor>] [| <id>]"),
    }
}

fn parse_board(args: &[&str]) -> Result<JourneyFilter> {
    let mut filter = JourneyFilter::default();
    for arg in args {
        match arg.split_once('=') {
            Some(("dept", value)) | Some(("department", value)) => {
                filter = filter.with_department(value);
            }
            Some(("search", value)) => filter = filter.with_search(value),
            Some(("stage", value)) => {
                let stage = value
                    .parse()
                    .with_context(|| format!("stage index '{}' is not a number", value))?;
                filter = filter.with_stage(stage);
            }
            Some(("sort", value)) => filter.sort_by = Some(value.parse()?),
            Some((key, _)) => bail!("unknown board option '{}'", key),
            None if arg.eq_ignore_ascii_case("desc") => filter.sort_desc = true,
            None => filter = filter.with_status(arg.parse()?),
        }
    }
    Ok(filter)
}

/// 解析整个脚本，返回 (行号, 命令或错误)
pub fn parse_script(content: &str) -> Vec<(usize, Result<Command>)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(offset, line)| (offset + 1, line.parse()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_journey::SortKey;

    #[test]
    fn test_parse_register() {
        let line = "register Arun Patel | Retina | Dr. Mehta | SCI-23051";
        let command: Command = line.parse().unwrap();
        assert_eq!(
            command,
            Command::Register(RegisterArgs {
                name: "Arun Patel".to_string(),
                department: "Retina".to_string(),
                doctor: Some("Dr. Mehta".to_string()),
                id: Some("SCI-23051".to_string()),
            })
        );

        let command: Command = "register Neha Desai | Pediatric".parse().unwrap();
        assert!(matches!(command, Command::Register(RegisterArgs { doctor: None, id: None, .. })));

        assert!("register Neha Desai".parse::<Command>().is_err());
        assert!("register | Retina".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_stage_commands() {
        assert_eq!(
            "advance SCI-23051 3".parse::<Command>().unwrap(),
            Command::Advance {
                patient_id: "SCI-23051".to_string(),
                stage: StageTarget::Index(3),
            }
        );
        assert_eq!(
            "advance SCI-23051 Pharmacy".parse::<Command>().unwrap(),
            Command::Advance {
                patient_id: "SCI-23051".to_string(),
                stage: StageTarget::Name("Pharmacy".to_string()),
            }
        );
        assert_eq!(
            "NEXT SCI-23051".parse::<Command>().unwrap(),
            Command::Next { patient_id: "SCI-23051".to_string() }
        );
        assert_eq!(
            "status SCI-23051 delayed".parse::<Command>().unwrap(),
            Command::Status {
                patient_id: "SCI-23051".to_string(),
                status: JourneyStatus::Delayed,
            }
        );
        assert!("advance SCI-23051 3x".parse::<Command>().is_err());
        assert!("advance SCI-23051".parse::<Command>().is_err());
        assert!("status SCI-23051 lost".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_board_and_unknown() {
        assert_eq!(
            "board".parse::<Command>().unwrap(),
            Command::Board(JourneyFilter::default())
        );
        assert_eq!(
            "board waiting".parse::<Command>().unwrap(),
            Command::Board(JourneyFilter::default().with_status(JourneyStatus::Waiting))
        );
        assert_eq!("stats".parse::<Command>().unwrap(), Command::Stats);
        assert!("print everything".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_board_options() {
        let expected = JourneyFilter::default()
            .with_status(JourneyStatus::Delayed)
            .with_department("Retina")
            .with_search("patel")
            .with_stage(2)
            .sorted_by(SortKey::WaitTime, true);
        assert_eq!(
            "board delayed dept=Retina search=patel stage=2 sort=wait desc"
                .parse::<Command>()
                .unwrap(),
            Command::Board(expected)
        );

        assert!("board stage=two".parse::<Command>().is_err());
        assert!("board sort=age".parse::<Command>().is_err());
        assert!("board doctor=Mehta".parse::<Command>().is_err());
        assert!("board lost".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_script_skips_comments() {
        let script = "# morning shift\n\nregister Arun Patel | Retina\nadvance SCI-1 x\n";
        let parsed = parse_script(script);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, 3);
        assert!(parsed[0].1.is_ok());
        assert_eq!(parsed[1].0, 4);
        assert!(parsed[1].1.is_err());
    }
}
