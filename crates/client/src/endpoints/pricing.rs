use barbearia_core::error::CoreError;
use barbearia_core::pricing::{PricingResult, PricingSimulation};
use barbearia_core::validation::validate_form;

use crate::api::ApiClient;

impl ApiClient {
    pub async fn simulate_pricing(
        &self,
        simulation: &PricingSimulation,
    ) -> Result<PricingResult, CoreError> {
        validate_form(simulation)?;
        if simulation.percent_load() >= 100.0 {
            return Err(CoreError::Validation(
                "percentuais somados devem ficar abaixo de 100%".into(),
            ));
        }
        Ok(self.post("pricing/simulate", simulation).await?)
    }
}
