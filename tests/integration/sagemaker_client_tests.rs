//! SageMaker HTTP clients against a mock server

use prophet_deploy::aws::AwsAuth;
use prophet_deploy::deploy::teardown_endpoint;
use prophet_deploy::platform::{
    ContainerDefinition, ControlPlane, CreateModelRequest, EndpointStatus, SageMakerClient,
    SageMakerRuntimeClient,
};
use prophet_deploy::{DeployError, Predictor};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::ROLE_ARN;
use crate::common::platform::MOCK_IMAGE;
use crate::{assert_err, assert_ok};

fn auth() -> AwsAuth {
    AwsAuth::new(
        "AKIATEST".to_string(),
        "secret".to_string(),
        None,
        "us-east-1".to_string(),
    )
}

fn control(server: &MockServer) -> SageMakerClient {
    SageMakerClient::new(&auth(), Some(&server.uri()), Duration::from_secs(5)).unwrap()
}

fn runtime(server: &MockServer) -> SageMakerRuntimeClient {
    SageMakerRuntimeClient::new(&auth(), Some(&server.uri()), Duration::from_secs(5)).unwrap()
}

fn target(operation: &str) -> wiremock::matchers::HeaderExactMatcher {
    header("x-amz-target", format!("SageMaker.{}", operation).as_str())
}

#[tokio::test]
async fn test_create_model_request_shape() {
    let server = MockServer::start().await;
    let request = CreateModelRequest {
        model_name: "pytorch-inference-2024-05-01-09-00-00-000".to_string(),
        execution_role_arn: ROLE_ARN.to_string(),
        primary_container: ContainerDefinition {
            image: MOCK_IMAGE.to_string(),
            model_data_url: "s3://bucket/prophet-cpi/model/prophet-model.tar.gz".to_string(),
            environment: BTreeMap::from([(
                "SAGEMAKER_PROGRAM".to_string(),
                "inference.py".to_string(),
            )]),
        },
    };

    Mock::given(method("POST"))
        .and(path("/"))
        .and(target("CreateModel"))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .and(body_json(json!({
            "ModelName": "pytorch-inference-2024-05-01-09-00-00-000",
            "ExecutionRoleArn": ROLE_ARN,
            "PrimaryContainer": {
                "Image": MOCK_IMAGE,
                "ModelDataUrl": "s3://bucket/prophet-cpi/model/prophet-model.tar.gz",
                "Environment": {"SAGEMAKER_PROGRAM": "inference.py"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ModelArn": "arn:aws:sagemaker:us-east-1:123456789012:model/m"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let arn = assert_ok!(control(&server).create_model(&request).await);
    assert_eq!(arn, "arn:aws:sagemaker:us-east-1:123456789012:model/m");
}

#[tokio::test]
async fn test_authorization_is_sigv4_for_sagemaker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(target("DeleteModel"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert_ok!(control(&server).delete_model("m").await);

    let requests = server.received_requests().await.unwrap();
    let authorization = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIATEST/"));
    assert!(authorization.contains("/us-east-1/sagemaker/aws4_request"));
    assert!(authorization.contains("x-amz-target"));
}

#[tokio::test]
async fn test_describe_endpoint_parses_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(target("DescribeEndpoint"))
        .and(body_json(json!({"EndpointName": "prophet-cpi-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "EndpointName": "prophet-cpi-1",
            "EndpointArn": "arn:aws:sagemaker:us-east-1:123456789012:endpoint/prophet-cpi-1",
            "EndpointConfigName": "prophet-cpi-1",
            "EndpointStatus": "Failed",
            "FailureReason": "Image pull failed",
            "CreationTime": 1714554000.0
        })))
        .mount(&server)
        .await;

    let description = assert_ok!(control(&server).describe_endpoint("prophet-cpi-1").await);
    assert_eq!(description.endpoint_status, EndpointStatus::Failed);
    assert_eq!(description.endpoint_config_name, "prophet-cpi-1");
    assert_eq!(description.failure_reason.as_deref(), Some("Image pull failed"));
}

#[tokio::test]
async fn test_unrecognized_status_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(target("DescribeEndpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "EndpointName": "e",
            "EndpointConfigName": "e",
            "EndpointStatus": "Hibernating"
        })))
        .mount(&server)
        .await;

    let description = assert_ok!(control(&server).describe_endpoint("e").await);
    assert_eq!(description.endpoint_status, EndpointStatus::Unknown);
}

#[tokio::test]
async fn test_error_response_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(target("DeleteEndpoint"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "com.amazon.coral.validate#ValidationException",
            "Message": "Could not find endpoint \"missing\"."
        })))
        .mount(&server)
        .await;

    let err = assert_err!(control(&server).delete_endpoint("missing").await);
    match err {
        DeployError::Api {
            operation,
            status,
            code,
            message,
        } => {
            assert_eq!(operation, "DeleteEndpoint");
            assert_eq!(status, 400);
            assert_eq!(code, "ValidationException");
            assert_eq!(message, "Could not find endpoint \"missing\".");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_invoke_endpoint_and_predict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/endpoints/prophet-cpi-1/invocations"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(header_exists("authorization"))
        .and(body_json(json!({"ds": ["2024-01-01"]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"ds": "2024-01-01", "yhat": 3.1}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let predictor = Predictor::new(
        "prophet-cpi-1",
        Arc::new(runtime(&server)),
        Arc::new(control(&server)),
    );
    let prediction = assert_ok!(predictor.predict(&json!({"ds": ["2024-01-01"]})).await);
    assert_eq!(prediction, json!([{"ds": "2024-01-01", "yhat": 3.1}]));
}

#[tokio::test]
async fn test_invoke_error_uses_header_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/endpoints/prophet-cpi-1/invocations"))
        .respond_with(
            ResponseTemplate::new(424)
                .insert_header("x-amzn-ErrorType", "ModelError:http://internal/")
                .set_body_string(""),
        )
        .mount(&server)
        .await;

    let predictor = Predictor::new(
        "prophet-cpi-1",
        Arc::new(runtime(&server)),
        Arc::new(control(&server)),
    );
    let err = assert_err!(predictor.predict(&json!({"ds": []})).await);
    assert_eq!(err.api_code(), Some("ModelError"));
    assert!(err.to_string().contains("HTTP 424"));
}

#[tokio::test]
async fn test_teardown_over_http_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(target("DescribeEndpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "EndpointName": "prophet-cpi-1",
            "EndpointConfigName": "prophet-cpi-1-config",
            "EndpointStatus": "InService"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(target("DescribeEndpointConfig"))
        .and(body_json(json!({"EndpointConfigName": "prophet-cpi-1-config"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "EndpointConfigName": "prophet-cpi-1-config",
            "ProductionVariants": [{
                "VariantName": "AllTraffic",
                "ModelName": "prophet-model-a",
                "InitialInstanceCount": 1,
                "InstanceType": "ml.m5.large"
            }]
        })))
        .mount(&server)
        .await;
    for operation in ["DeleteEndpoint", "DeleteEndpointConfig", "DeleteModel"] {
        Mock::given(method("POST"))
            .and(target(operation))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = control(&server);
    let report = assert_ok!(teardown_endpoint(&client, "prophet-cpi-1").await);
    assert_eq!(report.deleted.len(), 3);

    let targets: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|request| {
            request
                .headers
                .get("x-amz-target")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .collect();
    assert_eq!(
        targets,
        vec![
            "SageMaker.DescribeEndpoint",
            "SageMaker.DescribeEndpointConfig",
            "SageMaker.DeleteEndpoint",
            "SageMaker.DeleteEndpointConfig",
            "SageMaker.DeleteModel",
        ]
    );

    let deleted_model = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .last()
        .unwrap()
        .body_json::<serde_json::Value>()
        .unwrap();
    assert_eq!(deleted_model, json!({"ModelName": "prophet-model-a"}));
}
