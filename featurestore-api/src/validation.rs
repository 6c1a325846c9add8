//! Request validation, applied before any I/O — a `ValidationError` is never
//! retried server-side and never touches the cache or store.

use featurestore_core::ValidationError;

use crate::types::{BatchFeatureRequest, OnlineFeatureRequest, RegisterFeatureRequest};

pub fn validate_online_request(req: &OnlineFeatureRequest) -> Result<(), ValidationError> {
    if req.feature_names.is_empty() {
        return Err(ValidationError::EmptyFeatureNames);
    }
    Ok(())
}

pub fn validate_batch_request(
    req: &BatchFeatureRequest,
    max_batch_size: usize,
) -> Result<(), ValidationError> {
    if req.feature_names.is_empty() {
        return Err(ValidationError::EmptyFeatureNames);
    }
    if req.entity_ids.is_empty() || req.entity_ids.len() > max_batch_size {
        return Err(ValidationError::BatchTooLarge {
            requested: req.entity_ids.len(),
            max: max_batch_size,
        });
    }
    Ok(())
}

pub fn validate_register_request(req: &RegisterFeatureRequest) -> Result<(), ValidationError> {
    if req.version < 1 {
        return Err(ValidationError::NonPositiveVersion(req.version));
    }
    if req.ttl_hours < 1 {
        return Err(ValidationError::NonPositiveTtl(req.ttl_hours));
    }
    let len = req.name.len();
    if len == 0 || len > 255 {
        return Err(ValidationError::NameLengthOutOfRange(len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurestore_core::DType;

    #[test]
    fn rejects_empty_feature_names_online() {
        let req = OnlineFeatureRequest {
            entity_id: "u1".into(),
            feature_names: vec![],
        };
        assert_eq!(
            validate_online_request(&req),
            Err(ValidationError::EmptyFeatureNames)
        );
    }

    #[test]
    fn rejects_oversized_batch() {
        let req = BatchFeatureRequest {
            entity_ids: (0..1001).map(|i| i.to_string()).collect(),
            feature_names: vec!["f".into()],
            timestamp: None,
        };
        assert!(matches!(
            validate_batch_request(&req, 1000),
            Err(ValidationError::BatchTooLarge { requested: 1001, max: 1000 })
        ));
    }

    #[test]
    fn rejects_empty_batch_entity_list() {
        let req = BatchFeatureRequest {
            entity_ids: vec![],
            feature_names: vec!["f".into()],
            timestamp: None,
        };
        assert!(validate_batch_request(&req, 1000).is_err());
    }

    #[test]
    fn accepts_well_formed_register_request() {
        let req = RegisterFeatureRequest {
            name: "user_age".into(),
            version: 1,
            dtype: DType::Int64,
            entity_type: "user".into(),
            ttl_hours: 24,
            description: String::new(),
            tags: None,
        };
        assert!(validate_register_request(&req).is_ok());
    }

    #[test]
    fn rejects_zero_ttl() {
        let req = RegisterFeatureRequest {
            name: "user_age".into(),
            version: 1,
            dtype: DType::Int64,
            entity_type: "user".into(),
            ttl_hours: 0,
            description: String::new(),
            tags: None,
        };
        assert_eq!(
            validate_register_request(&req),
            Err(ValidationError::NonPositiveTtl(0))
        );
    }
}
