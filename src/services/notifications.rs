use crate::models::{Booking, User};
use crate::state::AppState;

/// What the booking notices need, resolved before the store lock is released.
#[derive(Debug, Clone)]
pub struct BookingNotice {
    pub booking: Booking,
    pub client: User,
    pub therapist: Option<User>,
    pub service_name: String,
}

impl BookingNotice {
    fn location(&self) -> String {
        let b = &self.booking;
        format!(
            "{}, {}, {} {}",
            b.location_address, b.location_city, b.location_state, b.location_zip
        )
    }

    fn date(&self) -> String {
        self.booking.appointment_date.format("%Y-%m-%d").to_string()
    }

    fn time(&self) -> String {
        self.booking.appointment_time.format("%H:%M").to_string()
    }

    fn therapist_name(&self) -> &str {
        self.therapist
            .as_ref()
            .map(|t| t.full_name.as_str())
            .unwrap_or("your therapist")
    }
}

/// Escapes the five HTML-special characters in user-supplied text.
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(ch),
        }
    }
    output
}

fn wrap(business: &str, tagline: &str, inner: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <div style=\"background: #18243D; padding: 24px; text-align: center;\">\
         <h1 style=\"color: white; margin: 0;\">{business}</h1>\
         <p style=\"color: #d4af37; margin: 0;\">{tagline}</p></div>\
         <div style=\"padding: 24px; background: white;\">{inner}</div></div>"
    )
}

pub fn client_confirmation_email(business: &str, n: &BookingNotice) -> (String, String) {
    let subject = format!("Booking Confirmation - {}", n.service_name);
    let body = format!(
        "<h2>Your booking is in</h2>\
         <p>Hi {client},</p>\
         <p><strong>Service:</strong> {service}<br>\
         <strong>Therapist:</strong> {therapist}<br>\
         <strong>Date:</strong> {date}<br>\
         <strong>Time:</strong> {time}<br>\
         <strong>Location:</strong> {location}<br>\
         <strong>Total:</strong> ${amount:.2}</p>\
         <p>Your therapist brings all equipment. Please make sure someone can let them in.</p>\
         <p>Need to change plans? Let us know at least 24 hours ahead.</p>",
        client = escape_html(&n.client.full_name),
        service = escape_html(&n.service_name),
        therapist = escape_html(n.therapist_name()),
        date = n.date(),
        time = n.time(),
        location = escape_html(&n.location()),
        amount = n.booking.total_amount,
    );
    (subject, wrap(business, "Mobile Massage Therapists", &body))
}

pub fn therapist_request_email(business: &str, n: &BookingNotice) -> (String, String) {
    let subject = format!("New Booking Request - {}", n.service_name);
    let body = format!(
        "<h2>New appointment request</h2>\
         <p>Hello {therapist},</p>\
         <p><strong>Client:</strong> {client}<br>\
         <strong>Service:</strong> {service}<br>\
         <strong>Date:</strong> {date}<br>\
         <strong>Time:</strong> {time}<br>\
         <strong>Location:</strong> {location}</p>\
         {requests}\
         <p>Sign in to your dashboard to confirm or decline.</p>",
        therapist = escape_html(n.therapist_name()),
        client = escape_html(&n.client.full_name),
        service = escape_html(&n.service_name),
        date = n.date(),
        time = n.time(),
        location = escape_html(&n.location()),
        requests = n
            .booking
            .special_requests
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(|r| format!("<p><strong>Special requests:</strong> {}</p>", escape_html(r)))
            .unwrap_or_default(),
    );
    (subject, wrap(business, "New Booking Alert", &body))
}

pub fn booking_sms(business: &str, n: &BookingNotice) -> String {
    format!(
        "Hi {}, your {} is booked for {} at {}. - {}",
        n.client.full_name,
        n.service_name,
        n.date(),
        n.time(),
        business
    )
}

pub fn application_received_email(business: &str, applicant_name: &str) -> (String, String) {
    let subject = format!("Application Received - {business}");
    let body = format!(
        "<h2>Thanks for applying</h2>\
         <p>Dear {name},</p>\
         <p>We have your application and will review your credentials, usually within 3-5 business days.</p>\
         <ul><li>Application review</li><li>Background and reference checks</li>\
         <li>Interview, if approved</li><li>Onboarding</li></ul>\
         <p>We'll keep you posted by email.</p>",
        name = escape_html(applicant_name),
    );
    (subject, wrap(business, "Application Received", &body))
}

/// Sends the client confirmation, the therapist request and the client SMS.
/// Failures are logged and never fail the booking.
pub async fn notify_booking_created(state: &AppState, notice: &BookingNotice) {
    let business = &state.config.business_name;
    let booking_id = &notice.booking.id;

    let (subject, html) = client_confirmation_email(business, notice);
    if let Err(e) = state
        .email
        .send_email(&notice.client.email, &subject, &html)
        .await
    {
        tracing::error!(%booking_id, error = %e, "failed to send client confirmation email");
    }

    if let Some(therapist) = &notice.therapist {
        let (subject, html) = therapist_request_email(business, notice);
        if let Err(e) = state.email.send_email(&therapist.email, &subject, &html).await {
            tracing::error!(%booking_id, error = %e, "failed to send therapist notification email");
        }
    }

    let sms = booking_sms(business, notice);
    if let Err(e) = state.messaging.send_message(&notice.client.phone, &sms).await {
        tracing::error!(%booking_id, error = %e, "failed to send booking SMS");
    }
}

pub async fn notify_application_received(state: &AppState, email: &str, name: &str) {
    let (subject, html) = application_received_email(&state.config.business_name, name);
    if let Err(e) = state.email.send_email(email, &subject, &html).await {
        tracing::error!(to = email, error = %e, "failed to send application email");
    }
}
