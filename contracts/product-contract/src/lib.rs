#[cfg(feature = "contract")]
mod contract_impl {
    use freenet_stdlib::prelude::*;
    use supplychain_common::ledger::{LedgerState, LedgerSummary, LedgerUpdate};
    use supplychain_common::LedgerError;

    pub struct Contract;

    fn decode_ledger(bytes: &[u8]) -> Result<LedgerState, ContractError> {
        if bytes.is_empty() {
            return Ok(LedgerState::default());
        }
        serde_json::from_slice(bytes).map_err(|e| ContractError::Deser(e.to_string()))
    }

    fn rejected(err: LedgerError) -> ContractError {
        match err {
            LedgerError::CorruptRecord { .. } => ContractError::Deser(err.to_string()),
            _ => ContractError::Other(err.to_string()),
        }
    }

    fn apply_delta(ledger: &mut LedgerState, bytes: &[u8]) -> Result<(), ContractError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let update: LedgerUpdate =
            serde_json::from_slice(bytes).map_err(|e| ContractError::Deser(e.to_string()))?;
        if let LedgerUpdate::Invoke(invocation) = &update {
            // Reads are served from the state itself and never ordered.
            if invocation.is_read_only() {
                return Err(ContractError::InvalidUpdate);
            }
        }
        ledger.apply_update(update).map_err(rejected)
    }

    fn replace_state(ledger: &mut LedgerState, bytes: &[u8]) -> Result<(), ContractError> {
        let incoming = decode_ledger(bytes)?;
        ledger
            .apply_update(LedgerUpdate::Sync(incoming))
            .map_err(rejected)
    }

    #[contract]
    impl ContractInterface for Contract {
        fn validate_state(
            _parameters: Parameters<'static>,
            state: State<'static>,
            _related: RelatedContracts<'static>,
        ) -> Result<ValidateResult, ContractError> {
            let ledger = decode_ledger(state.as_ref())?;
            if ledger.validate().is_err() {
                return Ok(ValidateResult::Invalid);
            }
            Ok(ValidateResult::Valid)
        }

        fn update_state(
            _parameters: Parameters<'static>,
            state: State<'static>,
            data: Vec<UpdateData<'static>>,
        ) -> Result<UpdateModification<'static>, ContractError> {
            let mut ledger = decode_ledger(state.as_ref())?;

            for ud in data {
                match ud {
                    UpdateData::State(s) => replace_state(&mut ledger, s.as_ref())?,
                    UpdateData::Delta(d) => apply_delta(&mut ledger, d.as_ref())?,
                    UpdateData::StateAndDelta { state, delta } => {
                        replace_state(&mut ledger, state.as_ref())?;
                        apply_delta(&mut ledger, delta.as_ref())?;
                    }
                    _ => return Err(ContractError::InvalidUpdate),
                }
            }

            let serialized =
                serde_json::to_vec(&ledger).map_err(|e| ContractError::Other(e.to_string()))?;
            Ok(UpdateModification::valid(State::from(serialized)))
        }

        fn summarize_state(
            _parameters: Parameters<'static>,
            state: State<'static>,
        ) -> Result<StateSummary<'static>, ContractError> {
            if state.is_empty() {
                return Ok(StateSummary::from(vec![]));
            }

            let ledger = decode_ledger(state.as_ref())?;
            let serialized = serde_json::to_vec(&ledger.summarize())
                .map_err(|e| ContractError::Other(e.to_string()))?;
            Ok(StateSummary::from(serialized))
        }

        fn get_state_delta(
            _parameters: Parameters<'static>,
            state: State<'static>,
            summary: StateSummary<'static>,
        ) -> Result<StateDelta<'static>, ContractError> {
            if state.is_empty() {
                return Ok(StateDelta::from(vec![]));
            }

            let ledger = decode_ledger(state.as_ref())?;

            let summary: LedgerSummary = if summary.is_empty() {
                LedgerSummary::default()
            } else {
                serde_json::from_slice(summary.as_ref())
                    .map_err(|e| ContractError::Deser(e.to_string()))?
            };

            let delta = LedgerUpdate::Sync(ledger.delta(&summary));
            let serialized =
                serde_json::to_vec(&delta).map_err(|e| ContractError::Other(e.to_string()))?;
            Ok(StateDelta::from(serialized))
        }
    }
}
