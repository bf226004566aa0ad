use eyre::Result;
use futures::future::join_all;
use hotel_booking_tests::TestCtxBuilder;
use util::{days_from_today, spread};

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_concurrent_same_room_and_date() -> Result<()> {
    let ctx = TestCtxBuilder::new()
        .with_rooms(5)
        .with_handler_threads(8)
        .build()
        .await?;
    let date = days_from_today(7);

    for round in 0..20u64 {
        let date = date + chrono::Days::new(round);
        let apis = spread(&ctx.api, 16);
        let responses = join_all(apis.iter().enumerate().map(|(i, api)| async move {
            api.store_booking(&format!("guest_{i}"), 3, date).await
        }))
        .await;
        drop(apis);

        let mut successes = 0;
        for response in responses {
            match response?.result {
                Ok(_) => successes += 1,
                Err(err) => {
                    assert_eq!(err.status, 500);
                    assert!(
                        err.msg
                            .starts_with("Failed to store booking: Booking already exists for room 3"),
                        "unexpected error: {}",
                        err.msg
                    );
                }
            }
        }
        assert_eq!(successes, 1, "Exactly one booking of room 3 on {date} must succeed.");
        assert_eq!(ctx.api.get_available_rooms(date).await?.result?, [1, 2, 4, 5]);
    }
    assert_eq!(ctx.store().len(), 20);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_concurrent_different_rooms() -> Result<()> {
    let ctx = TestCtxBuilder::new()
        .with_rooms(32)
        .with_handler_threads(8)
        .build()
        .await?;
    let date = days_from_today(1);

    let apis = spread(&ctx.api, 32);
    let responses = join_all(apis.iter().zip(1..).map(|(api, room)| async move {
        api.store_booking(&format!("guest_{room}"), room, date).await
    }))
    .await;
    drop(apis);

    for response in responses {
        assert!(
            response?.result.is_ok(),
            "Bookings of different rooms must not conflict."
        );
    }
    assert!(ctx.api.get_available_rooms(date).await?.result?.is_empty());
    for room in 1..=32 {
        let bookings = ctx
            .api
            .get_bookings_for_guest(&format!("guest_{room}"))
            .await?
            .result?;
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].room_number(), room);
    }

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_concurrent_single_guest() -> Result<()> {
    let ctx = TestCtxBuilder::new()
        .with_rooms(4)
        .with_handler_threads(4)
        .build()
        .await?;

    // 4 rooms on 10 days, all for the same guest
    let apis = spread(&ctx.api, 40);
    let responses = join_all(apis.iter().enumerate().map(|(i, api)| async move {
        let room = (i % 4) as u32 + 1;
        let date = days_from_today((i / 4) as u64);
        api.store_booking("regular", room, date).await
    }))
    .await;
    drop(apis);

    for response in responses {
        response?.result?;
    }
    let bookings = ctx.api.get_bookings_for_guest("regular").await?.result?;
    assert_eq!(bookings.len(), 40);
    assert_eq!(ctx.store().len(), 40);

    ctx.finish().await;
    Ok(())
}
