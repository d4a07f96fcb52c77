//! 1035 exchange intake and ACORD rendering.
//!
//! A 1035 exchange only moves once the losing-carrier transfer
//! authorization is signed; the handler blocks everything else. ACORD
//! output is a read-only view of the submitted application and is
//! available from `Submitted` onward.

use thiserror::Error;
use tracing::info;

use bindery_core::domain::application::{Application, ApplicationState};
use bindery_core::domain::premium::{Exchange1035, SourceOfFunds};

use crate::adapter::{CarrierGateway, ExchangeAcknowledgement, GatewayError};

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("ACORD output is disabled for this environment")]
    AcordDisabled,
    #[error("application is funded by {0}, not a 1035 exchange")]
    NotExchangeFunded(SourceOfFunds),
    #[error("application has no 1035 exchange details on file")]
    MissingExchange,
    #[error("losing-carrier transfer authorization is not signed")]
    UnsignedAuthorization,
    #[error("ACORD output requires a submitted application; current state is {0}")]
    NotSubmitted(ApplicationState),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub struct ExchangeHandler<G> {
    gateway: G,
    acord_enabled: bool,
}

impl<G> ExchangeHandler<G>
where
    G: CarrierGateway,
{
    pub fn new(gateway: G, acord_enabled: bool) -> Self {
        Self { gateway, acord_enabled }
    }

    fn exchange_details(application: &Application) -> Result<&Exchange1035, ExchangeError> {
        if application.premium.source_of_funds != SourceOfFunds::Exchange1035 {
            return Err(ExchangeError::NotExchangeFunded(application.premium.source_of_funds));
        }
        application
            .premium
            .exchange_1035
            .as_ref()
            .ok_or(ExchangeError::MissingExchange)
    }

    /// Forwards the exchange paperwork to the carrier. Refuses to move
    /// until the transfer authorization is signed.
    pub async fn submit(
        &self,
        application: &Application,
    ) -> Result<ExchangeAcknowledgement, ExchangeError> {
        let exchange = Self::exchange_details(application)?;
        let authorization = exchange
            .authorization
            .as_ref()
            .filter(|auth| auth.signed)
            .ok_or(ExchangeError::UnsignedAuthorization)?;

        let acknowledgement = self
            .gateway
            .submit_1035_exchange(&application.id, exchange, authorization)
            .await?;

        info!(
            application_id = %application.id,
            losing_carrier = %exchange.losing_carrier,
            accepted = acknowledgement.accepted,
            "1035 exchange forwarded"
        );
        Ok(acknowledgement)
    }

    /// Fetches the carrier's ACORD rendering of a submitted application.
    pub async fn acord_xml(
        &self,
        application: &Application,
    ) -> Result<String, ExchangeError> {
        if !self.acord_enabled {
            return Err(ExchangeError::AcordDisabled);
        }
        if application.state == ApplicationState::Draft {
            return Err(ExchangeError::NotSubmitted(application.state));
        }
        Ok(self.gateway.generate_acord_xml(&application.id).await?)
    }
}

/// Renders the ACORD 103 (annuity new business) document for an
/// application. Pure string assembly so the simulated gateway and
/// tests produce identical output for identical input.
pub fn render_acord_xml(application: &Application) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<TXLife xmlns=\"http://ACORD.org/Standards/Life/2\">\n");
    xml.push_str("  <TXLifeRequest>\n");
    xml.push_str("    <TransType tc=\"103\">New Business Submission</TransType>\n");

    push_element(&mut xml, 4, "ApplicationId", &application.id.0);
    push_element(&mut xml, 4, "CarrierCode", &application.product.carrier_code);
    push_element(&mut xml, 4, "ProductCode", &application.product.product_code);
    if let Some(plan_name) = &application.product.plan_name {
        push_element(&mut xml, 4, "PlanName", plan_name);
    }

    xml.push_str("    <Annuitant>\n");
    push_element(&mut xml, 6, "FullName", &application.annuitant.name.full());
    push_element(
        &mut xml,
        6,
        "BirthDate",
        &application.annuitant.date_of_birth.format("%Y-%m-%d").to_string(),
    );
    xml.push_str("    </Annuitant>\n");

    xml.push_str("    <Owner>\n");
    push_element(&mut xml, 6, "OwnerType", application.owner.kind());
    xml.push_str("    </Owner>\n");

    xml.push_str("    <Premium>\n");
    push_element(
        &mut xml,
        6,
        "InitialAmount",
        &application.premium.initial_amount.to_string(),
    );
    push_element(
        &mut xml,
        6,
        "SourceOfFunds",
        application.premium.source_of_funds.as_str(),
    );
    xml.push_str("    </Premium>\n");

    if let Some(exchange) = &application.premium.exchange_1035 {
        xml.push_str("    <Exchange1035>\n");
        push_element(&mut xml, 6, "LosingCarrier", &exchange.losing_carrier);
        push_element(&mut xml, 6, "PolicyNumber", &exchange.policy_number);
        if let Some(value) = exchange.account_value {
            push_element(&mut xml, 6, "AccountValue", &value.to_string());
        }
        if let Some(value) = exchange.surrender_value {
            push_element(&mut xml, 6, "SurrenderValue", &value.to_string());
        }
        xml.push_str("    </Exchange1035>\n");
    }

    xml.push_str("  </TXLifeRequest>\n");
    xml.push_str("</TXLife>\n");
    xml
}

fn push_element(xml: &mut String, indent: usize, name: &str, value: &str) {
    for _ in 0..indent {
        xml.push(' ');
    }
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
    xml.push_str(&escape_xml(value));
    xml.push_str("</");
    xml.push_str(name);
    xml.push_str(">\n");
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
