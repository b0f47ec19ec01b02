//! Command line arguments.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use encounter_core::PartyMember;

/// Run a live encounter session in the terminal
#[derive(Parser, Debug)]
#[command(name = "encounter")]
#[command(about = "Drive a live combat encounter from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Session identifier; names the snapshot and the log directory
    #[arg(long, env = "ENCOUNTER_SESSION")]
    pub session: Option<String>,

    /// Directory holding config.toml and catalog.ron
    #[arg(long, env = "ENCOUNTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Combat config file, instead of the one in the data directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Content catalog file, instead of the one in the data directory
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory for encounter snapshots (`default` for the platform data dir)
    #[arg(long)]
    pub save_dir: Option<String>,

    /// Keep encounter snapshots in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Party member as `key:name:hp:ac:initiative[:profile]` (repeatable)
    #[arg(long = "member", value_name = "SPEC")]
    pub members: Vec<MemberArg>,
}

/// A party member given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberArg(pub PartyMember);

impl FromStr for MemberArg {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
        if !(5..=6).contains(&parts.len()) {
            return Err(format!(
                "expected key:name:hp:ac:initiative[:profile], got `{spec}`"
            ));
        }
        let number = |index: usize, field: &str| {
            parts[index]
                .parse::<i32>()
                .map_err(|_| format!("{field} `{}` is not an integer", parts[index]))
        };
        let hp = number(2, "hp")?;
        if hp <= 0 {
            return Err(format!("hp must be positive, got {hp}"));
        }

        Ok(Self(PartyMember {
            key: parts[0].to_owned(),
            name: parts[1].to_owned(),
            hp,
            max_hp: hp,
            ac: number(3, "ac")?,
            initiative: number(4, "initiative")?,
            profile: parts.get(5).filter(|p| !p.is_empty()).map(|p| (*p).to_owned()),
        }))
    }
}

/// Party used when no `--member` is given.
pub fn default_party() -> Vec<PartyMember> {
    vec![PartyMember {
        key: "aria".into(),
        name: "Aria".into(),
        hp: 12,
        max_hp: 12,
        ac: 15,
        initiative: 15,
        profile: Some("fighter".into()),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_member_specs() {
        let MemberArg(member) = "bram:Bram:10:13:8:ranger".parse().unwrap();
        assert_eq!(member.name, "Bram");
        assert_eq!(member.max_hp, 10);
        assert_eq!(member.profile.as_deref(), Some("ranger"));

        let MemberArg(bare) = "cy:Cy:6:11:12".parse().unwrap();
        assert_eq!(bare.profile, None);
    }

    #[test]
    fn rejects_bad_member_specs() {
        assert!("a:A:x:10:10".parse::<MemberArg>().is_err());
        assert!("a:A:0:10:10".parse::<MemberArg>().is_err());
        assert!("a:A".parse::<MemberArg>().is_err());
    }

    #[test]
    fn cli_accepts_repeated_members() {
        let cli = Cli::try_parse_from([
            "encounter",
            "--session",
            "table",
            "--member",
            "a:A:5:10:10",
            "--member",
            "b:B:6:11:9",
            "--no-persist",
        ])
        .unwrap();
        assert_eq!(cli.members.len(), 2);
        assert!(cli.no_persist);
    }
}
