mod insecure_methods;
mod no_authentication;
mod no_https;
mod unsafe_verb;
mod untyped_query;

use super::Detector;

/// Returns all built-in detectors, one per finding category.
pub fn all_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(no_authentication::NoAuthenticationDetector),
        Box::new(insecure_methods::InsecureMethodsDetector),
        Box::new(no_https::NoHttpsDetector),
        Box::new(unsafe_verb::UnsafeVerbDetector),
        Box::new(untyped_query::UntypedQueryDetector),
    ]
}
