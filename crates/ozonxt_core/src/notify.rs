//! crates/ozonxt_core/src/notify.rs
//!
//! Builds pre-filled WhatsApp links addressed to the business number. The
//! client opens these; nothing here sends a message.

use crate::cart::Cart;
use crate::domain::{Booking, ContactSubmission};

/// `https://wa.me/<digits>?text=<message>`.
pub fn whatsapp_link(business_phone: &str, message: &str) -> String {
    let digits: String = business_phone
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    format!(
        "https://wa.me/{}?text={}",
        digits,
        urlencoding::encode(message)
    )
}

fn rupees(amount: u64) -> String {
    format!("₹{}.00", amount)
}

pub fn booking_message(booking: &Booking) -> String {
    let mut message = String::from("New Service Booking:\n\n");
    message.push_str(&format!("Booking ID: {}\n", booking.display_id));
    message.push_str(&format!("Name: {}\n", booking.name));
    message.push_str(&format!("Email: {}\n", booking.email));
    message.push_str(&format!("Phone: {}\n", booking.phone));
    message.push_str(&format!("Service: {}\n", booking.service_type));
    message.push_str(&format!(
        "Preferred Date: {}\n",
        booking.preferred_date.format("%d %b %Y")
    ));
    message.push_str(&format!("Preferred Time: {}", booking.preferred_time));
    message
}

pub fn contact_message(submission: &ContactSubmission, submitted_by: &str) -> String {
    let mut message = String::from("New Contact Form Submission:\n\n");
    message.push_str(&format!("Name: {}\n", submission.name));
    message.push_str(&format!("Email: {}\n", submission.email));
    message.push_str(&format!(
        "Subject: {}\n",
        submission.subject.as_deref().unwrap_or("N/A")
    ));
    message.push_str(&format!("Message: {}\n\n", submission.message));
    message.push_str(&format!("Submitted by: {}", submitted_by));
    message
}

pub fn cart_order_message(cart: &Cart) -> String {
    let mut message = String::from("Hello Ozonxt, I'd like to order the following items:\n\n");
    for item in cart.items() {
        message.push_str(&format!(
            "{} (x{}) - {}\n",
            item.product.name,
            item.quantity,
            rupees(item.line_total())
        ));
    }
    message.push_str(&format!("\nTotal: {}\n\n", rupees(cart.total())));
    message.push_str("Please let me know the next steps. Thank you!");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_product;

    #[test]
    fn link_strips_phone_punctuation_and_encodes_text() {
        let link = whatsapp_link("+91 95811-72082", "Hi there & welcome");
        assert_eq!(
            link,
            "https://wa.me/919581172082?text=Hi%20there%20%26%20welcome"
        );
    }

    #[test]
    fn cart_message_lists_lines_and_total() {
        let mut cart = Cart::new();
        cart.add(find_product("1").unwrap());
        cart.add(find_product("1").unwrap());
        let message = cart_order_message(&cart);
        assert!(message.contains("Dolphin RO (x2) - ₹14998.00"));
        assert!(message.contains("Total: ₹14998.00"));
    }
}
