use clap::{Arg, ArgAction, ArgMatches, Command};
use miner::{FeeRate, DEFAULT_BLOCK_MAX_WEIGHT, DEFAULT_BLOCK_MIN_TX_FEE, DEFAULT_STAKE_TIMIO};
use network::Network;

pub struct Config {
	pub network: Network,
	pub staking: bool,
	pub stake_timio: u64,
	pub block_max_weight: u32,
	pub block_min_fee_rate: FeeRate,
	pub block_version: Option<u32>,
	pub print_priority: bool,
	pub rpc_port: u16,
}

pub fn commandline() -> Command {
	Command::new("pmint")
		.about("Hybrid PoW/PoS coin client")
		.arg(Arg::new("testnet")
			.long("testnet")
			.action(ArgAction::SetTrue)
			.help("Use the test chain"))
		.arg(Arg::new("regtest")
			.long("regtest")
			.action(ArgAction::SetTrue)
			.help("Use the regression test chain"))
		.arg(Arg::new("staking")
			.long("staking")
			.action(ArgAction::SetTrue)
			.help("Stake your coins to support the network"))
		.arg(Arg::new("staketimio")
			.long("staketimio")
			.value_name("MILLISECONDS")
			.help("Base timeout between coinstake searches"))
		.arg(Arg::new("blockmaxweight")
			.long("blockmaxweight")
			.value_name("WEIGHT")
			.help("Maximum weight of assembled blocks"))
		.arg(Arg::new("blockmintxfee")
			.long("blockmintxfee")
			.value_name("FEERATE")
			.help("Lowest feerate (sat/kvB) for transactions entering assembled blocks"))
		.arg(Arg::new("blockversion")
			.long("blockversion")
			.value_name("VERSION")
			.help("Override the assembled block version (regtest only)"))
		.arg(Arg::new("printpriority")
			.long("printpriority")
			.action(ArgAction::SetTrue)
			.help("Log the fee of every transaction entering a template"))
		.arg(Arg::new("rpcport")
			.long("rpcport")
			.value_name("PORT")
			.help("Listen for JSON-RPC connections on this port"))
}

pub fn parse(matches: &ArgMatches) -> Result<Config, String> {
	let network = match (matches.get_flag("regtest"), matches.get_flag("testnet")) {
		(true, false) => Network::Regtest,
		(false, true) => Network::Testnet,
		(false, false) => Network::Mainnet,
		(true, true) => return Err("Only one of --testnet and --regtest may be given".into()),
	};

	let staking = matches.get_flag("staking");
	let print_priority = matches.get_flag("printpriority");

	let stake_timio = parse_arg(matches, "staketimio", DEFAULT_STAKE_TIMIO)?;
	let block_max_weight = parse_arg(matches, "blockmaxweight", DEFAULT_BLOCK_MAX_WEIGHT)?;
	let block_min_fee = parse_arg(matches, "blockmintxfee", DEFAULT_BLOCK_MIN_TX_FEE)?;
	let rpc_port = parse_arg(matches, "rpcport", default_rpc_port(network))?;

	let block_version = match matches.get_one::<String>("blockversion") {
		Some(_) if network != Network::Regtest =>
			return Err("--blockversion is only available on regtest".into()),
		Some(value) => Some(value.parse::<u32>().map_err(|_| "Invalid --blockversion".to_string())?),
		None => None,
	};

	Ok(Config {
		network,
		staking,
		stake_timio,
		block_max_weight,
		block_min_fee_rate: FeeRate::from_satoshis_per_kb(block_min_fee),
		block_version,
		print_priority,
		rpc_port,
	})
}

fn default_rpc_port(network: Network) -> u16 {
	match network {
		Network::Mainnet => 9556,
		Network::Testnet => 19556,
		Network::Regtest => 29556,
	}
}

fn parse_arg<T>(matches: &ArgMatches, name: &str, default: T) -> Result<T, String>
	where T: ::std::str::FromStr
{
	match matches.get_one::<String>(name) {
		Some(value) => value.parse().map_err(|_| format!("Invalid --{} value", name)),
		None => Ok(default),
	}
}
