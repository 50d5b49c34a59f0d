use chain::Transaction;
use script::Script;

/// Legacy signature operation count of a transaction: input and output
/// scripts only. The pay-to-script-hash surcharge needs the spent outputs
/// and is the mempool's concern; entries arrive with their full cost.
pub fn transaction_legacy_sigops(transaction: &Transaction) -> usize {
	let output_sigops: usize = transaction.outputs.iter().map(|output| {
		let output_script: Script = output.script_pubkey.clone().into();
		output_script.sigops_count(false)
	}).sum();

	let input_sigops: usize = transaction.inputs.iter().map(|input| {
		let input_script: Script = input.script_sig.clone().into();
		input_script.sigops_count(false)
	}).sum();

	input_sigops + output_sigops
}
