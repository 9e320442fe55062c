use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a service's build output was located.
///
/// Resolution happens during discovery; by the time a [`ServiceProject`]
/// exists its `build_output_path` is final and every kind hashes the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceKind {
  #[default]
  Default,
  GuestExecutable,
  AspNetCore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProject {
  pub service_name: String,
  pub build_output_path: PathBuf,
  pub kind: ServiceKind,
}

impl ServiceProject {
  pub fn new(service_name: impl Into<String>, build_output_path: impl Into<PathBuf>) -> Self {
    Self {
      service_name: service_name.into(),
      build_output_path: build_output_path.into(),
      kind: ServiceKind::Default,
    }
  }

  pub fn with_kind(mut self, kind: ServiceKind) -> Self {
    self.kind = kind;
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationProject {
  pub application_type_name: String,
  /// Application manifest shipped in the application-level package.
  pub manifest_path: Option<PathBuf>,
  pub services: BTreeMap<String, ServiceProject>,
}

impl ApplicationProject {
  pub fn new(application_type_name: impl Into<String>) -> Self {
    Self {
      application_type_name: application_type_name.into(),
      manifest_path: None,
      services: BTreeMap::new(),
    }
  }

  /// Adds a service, replacing any previous one with the same name.
  pub fn with_service(mut self, service: ServiceProject) -> Self {
    self.services.insert(service.service_name.clone(), service);
    self
  }
}

/// All applications of one run, keyed by application type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationTree {
  pub applications: BTreeMap<String, ApplicationProject>,
}

impl ApplicationTree {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_application(mut self, application: ApplicationProject) -> Self {
    self
      .applications
      .insert(application.application_type_name.clone(), application);
    self
  }

  pub fn get(&self, application: &str) -> Option<&ApplicationProject> {
    self.applications.get(application)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ApplicationProject> {
    self.applications.values()
  }

  pub fn service_count(&self) -> usize {
    self.applications.values().map(|a| a.services.len()).sum()
  }

  /// Drops the named applications, returning the remaining tree.
  pub fn without<'a, I>(&self, names: I) -> Self
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut applications = self.applications.clone();
    for name in names {
      applications.remove(name);
    }
    Self { applications }
  }
}
