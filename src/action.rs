//! Typed Query API actions.

use serde::de::DeserializeOwned;

use crate::credential::Credential;
use crate::error::Result;
use crate::request::Request;

/// A Query API endpoint: fixed host and API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    SimpleDb,
    Ec2,
}

impl Service {
    pub fn host(self) -> &'static str {
        match self {
            Service::SimpleDb => "sdb.amazonaws.com",
            Service::Ec2 => "ec2.amazonaws.com",
        }
    }

    pub fn version(self) -> &'static str {
        match self {
            Service::SimpleDb => "2009-04-15",
            Service::Ec2 => "2011-11-01",
        }
    }

    /// Starts an unsigned request against this service.
    pub fn request(self, credential: Credential) -> Request {
        Request::new(self.host(), self.version(), credential)
    }
}

/// One Query API operation and the response it decodes into.
pub trait Action {
    /// Value of the `Action` parameter.
    const NAME: &'static str;
    const SERVICE: Service;

    type Response: DeserializeOwned;

    /// Adds the action-specific parameters.
    fn add_params(&self, request: &mut Request);

    /// Rejects parameters the service is known to refuse.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Builds the unsigned request for this action.
    fn to_request(&self, credential: &Credential) -> Result<Request> {
        self.validate()?;
        let mut request = Self::SERVICE.request(credential.clone());
        request.add("Action", Self::NAME);
        self.add_params(&mut request);
        Ok(request)
    }
}
