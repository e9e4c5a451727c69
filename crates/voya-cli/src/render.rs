//! Plain-text rendering of conversation state

use voya_api::{ClarifyInfo, FlightInfo, Phase, TripInfo};
use voya_client::{AssistantState, Conversation, Message};

/// Print one streamed progress phase as it arrives.
pub fn print_phase(phase: Phase, message: Option<&str>) {
    match message {
        Some(text) => println!("  . {}: {}", phase.label(), text),
        None => println!("  . {}", phase.label()),
    }
}

/// Print the finalized assistant entry plus any structured attachments.
pub fn print_turn_outcome(conversation: &Conversation) {
    let Some(Message::Assistant { state, .. }) = conversation.messages.last() else {
        return;
    };

    match state {
        AssistantState::Progress { .. } => {}
        AssistantState::Error { content } => println!("\nassistant> {content}\n"),
        AssistantState::Final { content, .. } => {
            println!("\nassistant> {content}");
            if let Some(trip) = &conversation.trip_info {
                print_trip(trip);
            }
            if conversation.has_flights() {
                print_flights(&conversation.flights, conversation.is_mocked);
            }
            if let Some(clarify) = &conversation.clarify {
                print_clarify(clarify);
            }
            println!();
        }
    }
}

fn print_trip(trip: &TripInfo) {
    let route = format!(
        "{} -> {}",
        trip.departure.as_ref().map_or("?", |a| a.code.as_str()),
        trip.arrival.as_ref().map_or("?", |a| a.code.as_str()),
    );
    let dates = match (&trip.dep_date, &trip.return_date) {
        (Some(dep), Some(ret)) => format!("{dep} / {ret}"),
        (Some(dep), None) => dep.clone(),
        _ => "no date".to_string(),
    };
    println!(
        "  trip: {} {}, {}, cabin {}",
        trip.travel_type.name(),
        route,
        dates,
        trip.cabin_class
    );
}

fn print_flights(flights: &[FlightInfo], is_mocked: bool) {
    if is_mocked {
        println!("  {} flights (mock data):", flights.len());
    } else {
        println!("  {} flights:", flights.len());
    }
    for flight in flights {
        let route = flight
            .segments
            .iter()
            .map(|s| {
                format!(
                    "{} {} {} -> {}",
                    s.flight_no, s.departure.time, s.departure.code, s.arrival.code
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");
        println!(
            "    [{}] {}  {} {}",
            flight.id, route, flight.price.total, flight.price.currency
        );
    }
}

fn print_clarify(clarify: &ClarifyInfo) {
    println!("  {}", clarify.question);
    for (index, option) in clarify.options.iter().enumerate() {
        println!("    {}. {}", index + 1, option.label);
    }
    println!("  (reply with a number to choose)");
}

/// Print the diagnostic payload from the last search, if any.
pub fn print_debug(conversation: &Conversation) {
    match &conversation.debug_info {
        Some(debug) => match serde_json::to_string_pretty(debug) {
            Ok(text) => println!("{text}"),
            Err(e) => println!("debug info unavailable: {e}"),
        },
        None => println!("No debug info for this session."),
    }
}
