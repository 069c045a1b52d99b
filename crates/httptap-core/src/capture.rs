//! Body buffering that leaves request and response usable afterwards.

use bytes::Bytes;
use http_body_util::BodyExt;
use httptap_models::{ResponseFacet, header_snapshot};
use reqwest::{Body, Request, Response, ResponseBuilderExt, Url};

/// Read the request body into memory and put an identical body back.
///
/// Buffered bodies are copied; streaming bodies are drained and replaced.
pub(crate) async fn buffer_request_body(request: &mut Request) -> reqwest::Result<Option<Bytes>> {
    let Some(body) = request.body_mut().take() else {
        return Ok(None);
    };

    let buffered = body.as_bytes().map(Bytes::copy_from_slice);
    let bytes = match buffered {
        Some(bytes) => bytes,
        None => body.collect().await?.to_bytes(),
    };

    *request.body_mut() = Some(Body::from(bytes.clone()));
    Ok(Some(bytes))
}

/// Drain the response body and rebuild an equivalent response around it.
///
/// Status, version, headers, extensions and the final URL carry over
/// unchanged; the returned response reads back the same bytes.
pub(crate) async fn buffer_response(response: Response) -> reqwest::Result<(ResponseFacet, Response)> {
    // The URL lives outside the http parts and is dropped by the conversion.
    let url = response.url().clone();
    let response: http::Response<Body> = response.into();
    let (mut parts, body) = response.into_parts();
    let bytes = body.collect().await?.to_bytes();

    let facet = ResponseFacet::new(parts.status.as_u16(), header_snapshot(&parts.headers), &bytes);
    attach_url(&mut parts.extensions, url);
    let restored = Response::from(http::Response::from_parts(parts, bytes));
    Ok((facet, restored))
}

fn attach_url(extensions: &mut http::Extensions, url: Url) {
    if let Ok(marker) = http::Response::builder().url(url).body(()) {
        extensions.extend(marker.into_parts().0.extensions);
    }
}

/// Error text including every source in the chain.
pub(crate) fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
