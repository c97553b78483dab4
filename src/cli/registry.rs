use tracing::info;

use super::Commands;
use crate::account::{Amount, ONE_UNIT};
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::storage::Storage;
use crate::vm::{Call, CallOutput, RegistryVm};

/// Parse `123` as base units, or `1u` / `0.5u` as whole units.
pub fn parse_amount(s: &str) -> Result<Amount, String> {
    let s = s.trim();
    let Some(units) = s.strip_suffix('u') else {
        return s.parse::<Amount>().map_err(|e| format!("invalid amount '{}': {}", s, e));
    };

    let (whole, frac) = units.split_once('.').unwrap_or((units, ""));
    let decimals = ONE_UNIT.ilog10() as usize;
    if frac.len() > decimals || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid amount '{}': at most {} decimals", s, decimals));
    }
    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|e| format!("invalid amount '{}': {}", s, e))?
    };
    let frac: Amount = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals).parse().map_err(|e| format!("invalid amount '{}': {}", s, e))?
    };

    whole
        .checked_mul(ONE_UNIT)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| format!("amount '{}' overflows", s))
}

/// Render base units as whole units
pub fn format_amount(amount: Amount) -> String {
    let frac = amount % ONE_UNIT;
    if frac == 0 {
        format!("{}u", amount / ONE_UNIT)
    } else {
        let decimals = ONE_UNIT.ilog10() as usize;
        let frac = format!("{:0>width$}", frac, width = decimals);
        format!("{}.{}u", amount / ONE_UNIT, frac.trim_end_matches('0'))
    }
}

/// Load the world, run `f`, and persist the result only if `f` succeeded.
fn with_world<F>(config: &RegistryConfig, f: F) -> Result<(), RegistryError>
where
    F: FnOnce(&mut RegistryVm) -> Result<(), RegistryError>,
{
    let storage = Storage::new(&config.node.db_path)?;
    let mut vm = RegistryVm::from_state(storage.load_world()?);
    f(&mut vm)?;
    storage.save_world(vm.state())
}

/// Load the world and run `f` without writing anything back.
fn inspect_world<F>(config: &RegistryConfig, f: F) -> Result<(), RegistryError>
where
    F: FnOnce(&mut RegistryVm) -> Result<(), RegistryError>,
{
    let storage = Storage::new(&config.node.db_path)?;
    let mut vm = RegistryVm::from_state(storage.load_world()?);
    f(&mut vm)
}

pub fn handle_command(cmd: Commands, config: &RegistryConfig) -> Result<(), RegistryError> {
    match cmd {
        Commands::Deploy { owner } => with_world(config, |vm| {
            let address = vm.deploy(&owner, config.rules)?;
            println!("Registry deployed at {}", address);
            println!("Owner: {}", owner);
            Ok(())
        }),
        Commands::Mint { account, amount } => with_world(config, |vm| {
            vm.mint(&account, amount)?;
            println!("Minted {} to {}", format_amount(amount), account);
            Ok(())
        }),
        Commands::CreatePerson { from, name, age, height, value } => with_world(config, |vm| {
            vm.call(&from, value, Call::CreatePerson { name: name.clone(), age, height })?;
            println!("Person '{}' stored (paid {})", name, format_amount(value));
            Ok(())
        }),
        Commands::GetPerson { json } => inspect_world(config, |vm| {
            if let CallOutput::Person(p) = vm.call("", 0, Call::GetPerson)? {
                if json {
                    let s = serde_json::to_string_pretty(&p)
                        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
                    println!("{}", s);
                } else {
                    println!("Name:   {}", p.name);
                    println!("Age:    {}", p.age);
                    println!("Height: {}", p.height);
                    println!("Senior: {}", p.senior);
                }
            }
            Ok(())
        }),
        Commands::DeletePerson { from, target } => with_world(config, |vm| {
            vm.call(&from, 0, Call::DeletePerson { target })?;
            println!("Person deleted");
            Ok(())
        }),
        Commands::WithdrawAll { from } => with_world(config, |vm| {
            let before = vm.registry().map(|r| r.balance()).unwrap_or(0);
            vm.call(&from, 0, Call::WithdrawAll)?;
            info!("Withdrawal of {} committed", before);
            println!("Withdrew {} to {}", format_amount(before), from);
            Ok(())
        }),
        Commands::Balance { account } => inspect_world(config, |vm| {
            println!("{}: {}", account, format_amount(vm.balance_of(&account)));
            Ok(())
        }),
        Commands::Info => inspect_world(config, |vm| {
            let registry = vm.registry().ok_or(RegistryError::NotDeployed)?;
            let rules = registry.rules();
            println!("Address:     {}", registry.address());
            println!("Owner:       {}", registry.owner());
            println!("Balance:     {}", format_amount(registry.balance()));
            println!("Min payment: {}", format_amount(rules.min_payment));
            println!("Max age:     {}", rules.max_age);
            println!("Senior age:  {}", rules.senior_age);
            println!("Ledger accounts: {}", vm.state().ledger.account_count());
            for (account, amount) in vm.state().ledger.holders() {
                println!("  {:<42} {}", account, format_amount(amount));
            }
            Ok(())
        }),
        Commands::Events { json } => inspect_world(config, |vm| {
            for event in vm.events() {
                if json {
                    let s = serde_json::to_string(event)
                        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
                    println!("{}", s);
                } else {
                    println!("{}", event);
                }
            }
            Ok(())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::BalanceStore;

    #[test]
    fn test_parse_base_units() {
        assert_eq!(parse_amount("42"), Ok(42));
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_amount("1u"), Ok(ONE_UNIT));
        assert_eq!(parse_amount("0.5u"), Ok(ONE_UNIT / 2));
        assert_eq!(parse_amount(".25u"), Ok(ONE_UNIT / 4));
        assert_eq!(parse_amount("2.000000001u"), Ok(2 * ONE_UNIT + 1));
        assert!(parse_amount("0.0000000001u").is_err());
        assert!(parse_amount("1.x5u").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(ONE_UNIT), "1u");
        assert_eq!(format_amount(ONE_UNIT / 2), "0.5u");
        assert_eq!(format_amount(3 * ONE_UNIT + 1), "3.000000001u");
        assert_eq!(format_amount(0), "0u");
    }

    #[test]
    fn test_commands_persist_between_runs() {
        let dir = std::env::temp_dir().join(format!("person_registry_cli_{}", std::process::id()));
        let mut config = RegistryConfig::default();
        config.node.db_path = dir.to_string_lossy().to_string();

        handle_command(Commands::Deploy { owner: "owner".to_string() }, &config).unwrap();
        handle_command(Commands::Mint { account: "bob".to_string(), amount: 2 * ONE_UNIT }, &config).unwrap();
        let failed = handle_command(
            Commands::CreatePerson { from: "bob".to_string(), name: "Bob".to_string(), age: 200, height: 190, value: ONE_UNIT },
            &config,
        );
        assert!(failed.unwrap_err().revert().is_some());
        handle_command(
            Commands::CreatePerson { from: "bob".to_string(), name: "Bob".to_string(), age: 65, height: 190, value: ONE_UNIT },
            &config,
        )
        .unwrap();
        handle_command(Commands::WithdrawAll { from: "owner".to_string() }, &config).unwrap();

        let storage = Storage::new(&config.node.db_path).unwrap();
        let vm = RegistryVm::from_state(storage.load_world().unwrap());
        assert_eq!(vm.balance_of("owner"), ONE_UNIT);
        assert_eq!(vm.balance_of("bob"), ONE_UNIT);
        assert_eq!(vm.registry().unwrap().get_person().age, 65);
        vm.check_invariants().unwrap();

        drop(storage);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_queries_do_not_write() {
        let dir = std::env::temp_dir().join(format!("person_registry_query_{}", std::process::id()));
        let mut config = RegistryConfig::default();
        config.node.db_path = dir.to_string_lossy().to_string();

        handle_command(Commands::Balance { account: "bob".to_string() }, &config).unwrap();
        handle_command(Commands::Events { json: false }, &config).unwrap();
        assert!(matches!(handle_command(Commands::Info, &config), Err(RegistryError::NotDeployed)));

        let storage = Storage::new(&config.node.db_path).unwrap();
        assert_eq!(storage.get::<BalanceStore>("ledger").unwrap(), None);
        assert_eq!(storage.get::<u64>("deploy_nonce").unwrap(), None);

        drop(storage);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
